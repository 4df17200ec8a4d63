//! String-backed status enums.
//!
//! Status columns are plain `VARCHAR`s; these enums are the typed view used by
//! inputs and terminal-state checks.

/// Declare a lower-case, string-backed status enum with a default variant.
macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident, default = $default:ident, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name { $($variant),+ }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self { $($name::$variant => $text),+ }
            }
        }

        impl Default for $name {
            fn default() -> Self { $name::$default }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::errors::ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::errors::ModelError::invalid(format!(
                        "unknown {} '{}'", stringify!($name), other
                    ))),
                }
            }
        }
    };
}

status_enum!(
    /// Pricing plan availability.
    PricingStatus, default = Active, {
        Active => "active",
        Inactive => "inactive",
    }
);

status_enum!(
    InvestmentStatus, default = Pending, {
        Pending => "pending",
        Active => "active",
        Completed => "completed",
        Cancelled => "cancelled",
    }
);

status_enum!(
    /// `completed` is terminal.
    FundingStatus, default = Pending, {
        Pending => "pending",
        Processing => "processing",
        Completed => "completed",
        Failed => "failed",
    }
);

status_enum!(
    /// `successful` is terminal.
    PaymentStatus, default = Pending, {
        Pending => "pending",
        Successful => "successful",
        Failed => "failed",
    }
);

status_enum!(
    /// `completed` is terminal.
    WithdrawalStatus, default = Pending, {
        Pending => "pending",
        Approved => "approved",
        Completed => "completed",
        Rejected => "rejected",
    }
);

status_enum!(
    TransactionKind, default = Credit, {
        Credit => "credit",
        Debit => "debit",
    }
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Completed".parse::<FundingStatus>().unwrap(), FundingStatus::Completed);
        assert_eq!(" successful ".parse::<PaymentStatus>().unwrap(), PaymentStatus::Successful);
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "done".parse::<WithdrawalStatus>().unwrap_err();
        assert!(err.to_string().contains("WithdrawalStatus"));
    }

    #[test]
    fn defaults_match_declared_default() {
        assert_eq!(FundingStatus::default().as_str(), "pending");
        assert_eq!(PricingStatus::default().as_str(), "active");
        assert_eq!(TransactionKind::default(), TransactionKind::Credit);
    }

    #[test]
    fn serde_uses_lowercase_text() {
        let v = serde_json::to_value(InvestmentStatus::Cancelled).unwrap();
        assert_eq!(v, "cancelled");
        let parsed: FundingStatus = serde_json::from_str("\"processing\"").unwrap();
        assert_eq!(parsed, FundingStatus::Processing);
    }
}
