//! Per-row classification pipeline.
//!
//! normalize -> rail -> gateway/wallet -> beneficiary -> merchant -> intent
//! -> method specialisation -> person-transfer filter -> metadata.
//!
//! Nothing here fails: a row with no usable evidence comes out as
//! `Other`/`Other` with a low confidence and a reason saying why.

pub mod beneficiary;
pub mod fingerprint;
pub mod gateway;
pub mod intent;
pub mod merchants;
pub mod negative;
pub mod normalize;
pub mod rail;

use passbook_core::{
    Category, ClassificationMetadata, ClassifiedTransaction, Direction, EngineConfig,
    MerchantSource, Method, Rail,
};
use passbook_ingest::{RowDirection, StatementRow};
use tracing::debug;

use self::merchants::{MerchantCanonicalizer, MerchantKind, MerchantMatch, canonicalizer};
use self::negative::{TransferCheck, TransferEvidence};
use self::normalize::{NormalizedNarration, normalize};

/// Stamped on every row so output can be traced back to a rule set.
pub const RULE_VERSION: &str = "2024.11-r3";

/// Merchant matches below this only lend their name, not their category.
const MERCHANT_CATEGORY_CONFIDENCE: f64 = 0.8;

const SALARY_WORDS: &[&str] = &["SALARY", "PAYROLL", "WAGES", "SAL"];
const EMPLOYER_TOKENS: &[&str] = &[
    "PVT", "LTD", "LIMITED", "LLP", "TECHNOLOGIES", "SOLUTIONS", "INFOTECH", "SYSTEMS",
    "CONSULTING", "CONSULTANCY", "SOFTWARE", "LABS",
];
const INTEREST_WORDS: &[&str] = &["INT.PD", "INTEREST", "INT CREDIT", "INT PD"];
const DIVIDEND_WORDS: &[&str] = &["DIVIDEND", "DIV"];
const REFUND_WORDS: &[&str] = &["REFUND", "REVERSAL", "CASHBACK"];
const TAX_WORDS: &[&str] = &["GST", "TDS", "INCOME TAX", "ADVANCE TAX", "CBDT"];
const ATM_WORDS: &[&str] = &["ATM", "ATW", "NWD", "CASH WDL", "ATM WDL", "CASH WITHDRAWAL"];
const EMI_WORDS: &[&str] = &["EMI", "LOAN"];
const SIP_WORDS: &[&str] = &["SIP", "SYSTEMATIC"];
const RD_WORDS: &[&str] = &["RD", "RECURRING DEPOSIT"];
const FD_WORDS: &[&str] = &["FD", "FIXED DEPOSIT", "TERM DEPOSIT"];
const INSURANCE_WORDS: &[&str] = &["PREMIUM", "INSURANCE", "LIC"];

/// Working state for one row while the stages run.
struct Decision {
    method: Method,
    category: Category,
    /// Component confidences; the effective confidence is their minimum
    confidences: Vec<f64>,
    keywords: Vec<String>,
    reasons: Vec<String>,
}

impl Decision {
    fn note(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    fn keyword(&mut self, keyword: &str) {
        if !self.keywords.iter().any(|k| k == keyword) {
            self.keywords.push(keyword.to_string());
        }
    }

    fn set(&mut self, method: Method, category: Category, confidence: f64, reason: &str) {
        self.method = method;
        self.category = category;
        self.confidences.push(confidence);
        self.note(reason);
    }

    fn effective_confidence(&self) -> f64 {
        self.confidences
            .iter()
            .copied()
            .fold(1.0_f64, f64::min)
            .clamp(0.0, 1.0)
    }
}

pub struct Classifier<'a> {
    config: &'a EngineConfig,
    merchants: &'static MerchantCanonicalizer,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            merchants: canonicalizer(),
        }
    }

    pub fn classify_all(&self, rows: &[StatementRow]) -> Vec<ClassifiedTransaction> {
        rows.iter().map(|row| self.classify_row(row)).collect()
    }

    pub fn classify_row(&self, row: &StatementRow) -> ClassifiedTransaction {
        let raw = &row.raw;
        let n = normalize(&raw.narration);
        let direction = match row.direction {
            RowDirection::Debit => Direction::Debit,
            RowDirection::Credit => Direction::Credit,
        };

        let rail = rail::detect_rail(&n);
        let gw = gateway::extract(&n);
        let beneficiary = beneficiary::extract(&n.upper, rail);
        let merchant_hit = self.merchants.canonicalize(&n, beneficiary.as_deref());
        let confident = merchant_hit
            .as_ref()
            .filter(|hit| hit.confidence >= MERCHANT_CATEGORY_CONFIDENCE);
        let intent = intent::score(&n);

        let mut d = Decision {
            method: rail.method(),
            category: Category::Other,
            confidences: vec![if rail == Rail::Unknown { 0.5 } else { 0.9 }],
            keywords: Vec::new(),
            reasons: vec![format!("rail {}", rail.as_str())],
        };

        // Category evidence: confident merchant first, then intent keywords.
        if let Some(hit) = confident {
            d.category = hit.category;
            d.confidences.push(hit.confidence);
            d.keyword(&hit.matched);
            d.note(format!("merchant {} via {}", hit.canonical, hit.matched));
        } else if let Some((category, weight)) = intent.best_for(direction) {
            d.category = category;
            d.confidences.push(weight);
            d.note(format!("intent {} ({weight:.2})", category.as_str()));
        }
        for kw in &intent.matched {
            d.keyword(kw);
        }

        match direction {
            Direction::Credit => {
                let payer = beneficiary.as_deref();
                self.specialise_credit(&mut d, &n, rail, row.amount, confident, payer)
            }
            Direction::Debit => specialise_debit(&mut d, &n, rail, confident, gw.gateway.is_some()),
        }

        let mut person_transfer = false;
        if direction == Direction::Debit && d.method.is_rail_level() && confident.is_none() {
            let evidence = negative::person_transfer(&TransferCheck {
                narration: &n,
                beneficiary: beneficiary.as_deref(),
                rail,
                amount: row.amount,
                intent: &intent,
                large_transfer_amount: self.config.p2p_transfer_amount,
            });
            if let Some(evidence) = evidence {
                person_transfer = true;
                d.method = Method::SelfTransfer;
                d.category = Category::SelfTransfer;
                // Purchase evidence no longer counts.
                d.confidences.truncate(1);
                d.confidences.push(match evidence {
                    TransferEvidence::ExplicitPhrase => 0.9,
                    TransferEvidence::LargeInstantTransfer => 0.8,
                    TransferEvidence::PersonShapedName => 0.7,
                });
                d.note(evidence.reason());
            }
        }

        if d.category == Category::Other && d.method == Method::Other {
            d.confidences.push(0.2);
            d.note("no rail, merchant or keyword evidence");
            debug!(index = row.index, narration = %n.cleaned, "row fell back to Other");
        } else if d.category == Category::Other && d.method != Method::TaxPayment {
            d.confidences.push(0.4);
            d.note("no category evidence");
            debug!(index = row.index, method = d.method.as_str(), "category fell back to Other");
        }

        let (merchant, merchant_source) = match (&merchant_hit, &beneficiary) {
            (Some(hit), _) if !person_transfer => {
                (hit.canonical.to_string(), MerchantSource::Canonical)
            }
            (_, Some(name)) => (name.clone(), MerchantSource::Beneficiary),
            _ => {
                let text = n.truncated(5, 60);
                if text.is_empty() {
                    ("Unknown".to_string(), MerchantSource::Narration)
                } else {
                    (text, MerchantSource::Narration)
                }
            }
        };

        let classification_metadata = ClassificationMetadata {
            confidence: d.effective_confidence(),
            matched_keywords: d.keywords.clone(),
            gateway: gw.gateway.map(str::to_string),
            wallet: gw.wallet.map(str::to_string),
            channel: rail,
            merchant_source,
            person_transfer,
            rule_version: RULE_VERSION.to_string(),
            reason: d.reasons.join("; "),
        };

        ClassifiedTransaction {
            date: raw.date.clone(),
            narration: raw.narration.clone(),
            cheque_ref_no: raw.cheque_ref_no.clone(),
            value_date: raw.value_date.clone(),
            withdrawal_amount: raw.withdrawal_amount,
            deposit_amount: raw.deposit_amount,
            closing_balance: raw.closing_balance,
            method: d.method,
            category: d.category,
            merchant,
            beneficiary,
            is_income: raw.deposit_amount > 0.0 && raw.withdrawal_amount == 0.0,
            is_recurring: false,
            recurring_metadata: None,
            classification_metadata,
            index: row.index,
            posted: row.posted,
            direction,
            amount: row.amount,
        }
    }

    fn specialise_credit(
        &self,
        d: &mut Decision,
        n: &NormalizedNarration,
        rail: Rail,
        amount: f64,
        merchant: Option<&MerchantMatch>,
        beneficiary: Option<&str>,
    ) {
        if let Some(kw) = first_match(n, SALARY_WORDS) {
            d.keyword(kw);
            d.set(Method::Salary, Category::Salary, 0.9, "salary wording");
            return;
        }
        if amount >= self.config.salary_min_amount
            && merchant.is_none()
            && matches!(rail, Rail::Neft | Rail::Rtgs | Rail::Ach | Rail::Nach | Rail::Imps)
            && looks_like_employer(n, beneficiary)
        {
            d.set(Method::Salary, Category::Salary, 0.6, "large credit from an employer-shaped payer");
            return;
        }
        if let Some(kw) = INTEREST_WORDS.iter().copied().find(|w| n.matches_raw(w)) {
            d.keyword(kw);
            d.set(Method::Interest, Category::Income, 0.9, "interest credit");
            return;
        }
        if let Some(kw) = first_match(n, DIVIDEND_WORDS) {
            d.keyword(kw);
            d.set(Method::Dividend, Category::Income, 0.9, "dividend credit");
            return;
        }
        if let Some(kw) = first_match(n, REFUND_WORDS) {
            d.keyword(kw);
            d.category = Category::Refund;
            d.confidences.push(0.85);
            d.note("refund credit");
            return;
        }
        // Every other credit is income, whatever the merchant sells.
        d.category = Category::Income;
    }
}

fn specialise_debit(
    d: &mut Decision,
    n: &NormalizedNarration,
    rail: Rail,
    merchant: Option<&MerchantMatch>,
    via_gateway: bool,
) {
    let kind = merchant.map(|hit| hit.kind);

    if let Some(kw) = first_match(n, TAX_WORDS) {
        d.keyword(kw);
        d.set(Method::TaxPayment, Category::Other, 0.85, "tax payment");
        return;
    }
    if kind == Some(MerchantKind::Government) {
        d.set(Method::TaxPayment, Category::Other, 0.85, "tax payment");
        return;
    }
    if let Some(kw) = first_match(n, ATM_WORDS) {
        d.keyword(kw);
        d.method = Method::AtmWithdrawal;
        d.confidences.push(0.9);
        d.note("cash withdrawal");
        return;
    }
    for (words, method) in [(SIP_WORDS, Method::Sip), (RD_WORDS, Method::Rd), (FD_WORDS, Method::Fd)] {
        if let Some(kw) = first_match(n, words) {
            d.keyword(kw);
            d.set(method, Category::Investment, 0.85, "deposit or SIP instruction");
            return;
        }
    }
    if rail.is_mandate() {
        if let Some(kw) = first_match(n, EMI_WORDS) {
            d.keyword(kw);
            d.set(Method::Emi, Category::Loan, 0.9, "loan instalment on mandate");
            return;
        }
        if kind == Some(MerchantKind::Lender) {
            d.set(Method::Emi, Category::Loan, 0.85, "lender mandate");
            return;
        }
    }
    if kind == Some(MerchantKind::Insurer) {
        d.set(Method::Insurance, Category::BillsUtilities, 0.9, "insurance premium");
        return;
    }
    if let Some(kw) = first_match(n, INSURANCE_WORDS) {
        d.keyword(kw);
        d.set(Method::Insurance, Category::BillsUtilities, 0.8, "insurance premium");
        return;
    }
    if matches!(kind, Some(MerchantKind::Broker | MerchantKind::Crypto)) && d.method.is_rail_level() {
        d.method = Method::Investment;
        d.note("investment platform");
        return;
    }
    if d.category == Category::Shopping && (rail == Rail::Pos || via_gateway) {
        d.method = Method::OnlineShopping;
        d.note("card or gateway purchase");
    }
}


/// First word of `words` found in the narration, under the shared keyword rules.
fn first_match(n: &NormalizedNarration, words: &[&'static str]) -> Option<&'static str> {
    words.iter().copied().find(|w| n.matches_keyword(w))
}

fn looks_like_employer(n: &NormalizedNarration, beneficiary: Option<&str>) -> bool {
    let has = |text: &str| {
        text.split_whitespace()
            .any(|w| EMPLOYER_TOKENS.contains(&w))
    };
    beneficiary.is_some_and(has) || EMPLOYER_TOKENS.iter().any(|t| n.has_token(t))
}
