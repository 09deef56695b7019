//! Payment gateway and wallet extraction.
//!
//! A gateway is the aggregator that routed a payment, a wallet is the app the
//! payer used. Neither says anything about the rail.

use super::normalize::NormalizedNarration;

/// (pattern, gateway) scanned in order; more specific patterns sit above the
/// patterns they contain.
const GATEWAYS: &[(&str, &str)] = &[
    ("PHONEPE PG", "PhonePe PG"),
    ("PHONEPE PAYMENT GATEWAY", "PhonePe PG"),
    ("BBPS", "BBPS"),
    ("BHARAT BILLPAY", "BBPS"),
    ("BILLDESK", "BillDesk"),
    ("BILL DESK", "BillDesk"),
    ("PAYU", "PayU"),
    ("RAZORPAY", "Razorpay"),
    ("RAZ PAY", "Razorpay"),
    ("CCAVENUE", "CCAvenue"),
    ("CC AVENUE", "CCAvenue"),
    ("CASHFREE", "Cashfree"),
    ("JUSPAY", "Juspay"),
    ("EASEBUZZ", "Easebuzz"),
    ("INSTAMOJO", "Instamojo"),
    ("TECHPROCESS", "TechProcess"),
    ("PAYPAL", "PayPal"),
    ("STRIPE", "Stripe"),
    ("PAYGLOCAL", "PayGlocal"),
];

/// Wallet app names.
const WALLETS: &[(&str, &str)] = &[
    ("MOBIKWIK", "Mobikwik"),
    ("PAYTM", "Paytm"),
    ("PHONEPE", "PhonePe"),
    ("GOOGLE PAY", "GPay"),
    ("GPAY", "GPay"),
    ("AMAZON PAY", "Amazon Pay"),
    ("FREECHARGE", "Freecharge"),
    ("AIRTEL MONEY", "Airtel Payments Bank"),
    ("JIOMONEY", "JioMoney"),
    ("CRED PAY", "CRED"),
    ("BHIM", "BHIM"),
];

/// VPA handle suffixes and the wallet that issues them.
const VPA_HANDLES: &[(&str, &str)] = &[
    ("@YBL", "PhonePe"),
    ("@IBL", "PhonePe"),
    ("@AXL", "PhonePe"),
    ("@PAYTM", "Paytm"),
    ("@PTYES", "Paytm"),
    ("@PTSBI", "Paytm"),
    ("@PTHDFC", "Paytm"),
    ("@PTAXIS", "Paytm"),
    ("@OKAXIS", "GPay"),
    ("@OKHDFCBANK", "GPay"),
    ("@OKICICI", "GPay"),
    ("@OKSBI", "GPay"),
    ("@APL", "Amazon Pay"),
    ("@YAPL", "Amazon Pay"),
    ("@IKWIK", "Mobikwik"),
    ("@FREECHARGE", "Freecharge"),
    ("@UPI", "BHIM"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayInfo {
    pub gateway: Option<&'static str>,
    pub wallet: Option<&'static str>,
}

pub fn extract(n: &NormalizedNarration) -> GatewayInfo {
    let gateway = GATEWAYS
        .iter()
        .find(|(pattern, _)| n.matches_keyword(pattern))
        .map(|&(_, name)| name);

    // A VPA handle is the strongest wallet evidence; names come second.
    let wallet = VPA_HANDLES
        .iter()
        .find(|(handle, _)| vpa_handle_present(&n.upper, handle))
        .or_else(|| WALLETS.iter().find(|(pattern, _)| n.matches_keyword(pattern)))
        .map(|&(_, name)| name);

    GatewayInfo { gateway, wallet }
}

/// The handle must end the VPA, so `@OK` style prefixes cannot leak into
/// longer bank handles.
fn vpa_handle_present(upper: &str, handle: &str) -> bool {
    upper.match_indices(handle).any(|(at, m)| {
        upper[at + m.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_ascii_alphanumeric())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::normalize::normalize;

    fn info(s: &str) -> GatewayInfo {
        extract(&normalize(s))
    }

    #[test]
    fn test_gateway_and_wallet_are_separate() {
        let i = info("UPI-BILLDESK-TATA POWER-billdesk@ybl-REF 1");
        assert_eq!(i.gateway, Some("BillDesk"));
        assert_eq!(i.wallet, Some("PhonePe"));
    }

    #[test]
    fn test_specific_gateway_first() {
        assert_eq!(info("PHONEPE PG SWIGGY ORDER").gateway, Some("PhonePe PG"));
        assert_eq!(info("BBPS BILLDESK ELECTRICITY").gateway, Some("BBPS"));
        assert_eq!(info("NEFT RAZORPAY SOFTWARE").gateway, Some("Razorpay"));
    }

    #[test]
    fn test_wallet_from_vpa_handle() {
        assert_eq!(info("UPI-SHOP-shop@okhdfcbank").wallet, Some("GPay"));
        assert_eq!(info("UPI-SHOP-shop@paytm").wallet, Some("Paytm"));
        assert_eq!(info("UPI-SHOP-shop@apl").wallet, Some("Amazon Pay"));
        assert_eq!(info("MOBIKWIK WALLET LOAD").wallet, Some("Mobikwik"));
        assert_eq!(info("NEFT-ACME LTD"), GatewayInfo::default());
    }
}
