//! CIDR notation validation.

use ipnet::IpNet;

use crate::error::CidrError;

/// Check that `cidr` is syntactically a valid CIDR block.
///
/// The address must parse and the prefix length must be within range for
/// its family. Host bits are allowed to be set (`192.168.1.1/24` is valid).
///
/// # Examples
/// ```
/// use ip_whitelist::validate_cidr;
///
/// assert!(validate_cidr("192.168.1.0/24").is_ok());
/// assert!(validate_cidr("192.168.1.0/33").is_err());
/// assert!(validate_cidr("192.168.1.0").is_err());
/// ```
pub fn validate_cidr(cidr: &str) -> Result<(), CidrError> {
    cidr.parse::<IpNet>()
        .map(|_| ())
        .map_err(|_| CidrError::InvalidCidr(cidr.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cidrs() {
        assert!(validate_cidr("192.168.1.0/24").is_ok());
        assert!(validate_cidr("192.168.1.1/32").is_ok());
        assert!(validate_cidr("0.0.0.0/0").is_ok());
        assert!(validate_cidr("2001:db8::/32").is_ok());
    }

    #[test]
    fn test_invalid_cidrs() {
        assert!(validate_cidr("192.168.1.0/33").is_err()); // Mask out of range
        assert!(validate_cidr("192.168.1/24").is_err()); // Short address
        assert!(validate_cidr("192.168.1.0").is_err()); // No mask
        assert!(validate_cidr("999.168.1.0/24").is_err()); // Bad octet
        assert!(validate_cidr("").is_err());
    }

    #[test]
    fn test_error_carries_input() {
        assert_eq!(
            validate_cidr("invalid"),
            Err(CidrError::InvalidCidr("invalid".to_string()))
        );
    }
}
