//! Forward-looking projections and Section 80C / 80D deduction hints.

use chrono::{Duration, NaiveDate};
use passbook_core::{ClassifiedTransaction, EngineConfig, Method, StatementMeta};
use serde::Serialize;

use super::salary::{balances, statement_days};
use super::stats::round2;
use crate::classify::normalize::{NormalizedNarration, normalize};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEmi {
    pub name: String,
    pub amount: f64,
    pub last_paid: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveInsights {
    pub avg_daily_expense: f64,
    pub projected_30_day_spend: f64,
    /// DD/MM/YYYY; absent when spend or balance gives no runway
    pub predicted_low_balance_date: Option<String>,
    pub days_until_low_balance: Option<i64>,
    pub upcoming_emi: Option<UpcomingEmi>,
    pub upcoming_emi_impact: f64,
}

pub fn predictive_insights(
    meta: &StatementMeta,
    rows: &[ClassifiedTransaction],
    today: NaiveDate,
) -> PredictiveInsights {
    let expense: f64 = rows
        .iter()
        .filter(|t| t.is_operational_expense())
        .map(|t| t.amount)
        .sum();
    let avg_daily = expense / statement_days(rows) as f64;
    let (_, closing) = balances(meta, rows);

    let runway = (avg_daily > 0.0 && closing > 0.0).then(|| (closing / avg_daily).floor() as i64);
    let predicted_low_balance_date =
        runway.map(|days| (today + Duration::days(days)).format("%d/%m/%Y").to_string());

    let mut emis: Vec<&ClassifiedTransaction> = rows
        .iter()
        .filter(|t| t.is_recurring && t.method == Method::Emi)
        .collect();
    emis.sort_by_key(|t| (t.posted, t.index));
    let upcoming_emi = emis.first().map(|t| UpcomingEmi {
        name: t.merchant.clone(),
        amount: round2(t.amount),
        last_paid: emis.last().map_or_else(|| t.date.clone(), |last| last.date.clone()),
    });

    PredictiveInsights {
        avg_daily_expense: round2(avg_daily),
        projected_30_day_spend: round2(avg_daily * 30.0),
        predicted_low_balance_date,
        days_until_low_balance: runway,
        upcoming_emi_impact: upcoming_emi.as_ref().map_or(0.0, |e| e.amount),
        upcoming_emi,
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum TaxSection {
    #[serde(rename = "80C")]
    Section80C,
    #[serde(rename = "80D")]
    Section80D,
    /// Investment spotted but no deduction attaches to it
    #[serde(rename = "none")]
    NotQualifying,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxItem {
    pub date: String,
    pub narration: String,
    pub instrument: &'static str,
    pub section: TaxSection,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxInsights {
    pub section_80c_used: f64,
    pub section_80c_cap: f64,
    pub section_80c_headroom: f64,
    pub section_80d_used: f64,
    pub section_80d_cap: f64,
    pub section_80d_headroom: f64,
    pub potential_tax_saving: f64,
    pub items: Vec<TaxItem>,
    pub missed_deductions: Vec<String>,
}

/// (keyword, instrument, section); first hit wins, so specific instruments
/// come before the generic fund words.
const TAX_INSTRUMENTS: &[(&str, &str, TaxSection)] = &[
    ("ELSS", "ELSS", TaxSection::Section80C),
    ("TAX SAVER", "ELSS", TaxSection::Section80C),
    ("PPF", "PPF", TaxSection::Section80C),
    ("PUBLIC PROVIDENT", "PPF", TaxSection::Section80C),
    ("NPS", "NPS", TaxSection::Section80C),
    ("PRAN", "NPS", TaxSection::Section80C),
    ("SUKANYA", "Sukanya Samriddhi", TaxSection::Section80C),
    ("HEALTH INSURANCE", "Health insurance", TaxSection::Section80D),
    ("MEDICLAIM", "Health insurance", TaxSection::Section80D),
    ("STAR HEALTH", "Health insurance", TaxSection::Section80D),
    ("CARE HEALTH", "Health insurance", TaxSection::Section80D),
    ("NIVA BUPA", "Health insurance", TaxSection::Section80D),
    ("HDFC ERGO", "Health insurance", TaxSection::Section80D),
    ("LIC", "Life insurance", TaxSection::Section80C),
    ("LIFE INSURANCE", "Life insurance", TaxSection::Section80C),
    ("HDFC LIFE", "Life insurance", TaxSection::Section80C),
    ("SBI LIFE", "Life insurance", TaxSection::Section80C),
    ("ICICI PRU LIFE", "Life insurance", TaxSection::Section80C),
    ("MAX LIFE", "Life insurance", TaxSection::Section80C),
    ("MUTUAL FUND", "Mutual fund", TaxSection::NotQualifying),
    ("MF", "Mutual fund", TaxSection::NotQualifying),
    ("SIP", "Mutual fund", TaxSection::NotQualifying),
];

fn instrument(n: &NormalizedNarration) -> Option<(&'static str, TaxSection)> {
    TAX_INSTRUMENTS
        .iter()
        .find(|(kw, _, _)| n.matches_keyword(kw))
        .map(|&(_, name, section)| (name, section))
}

pub fn tax_insights(rows: &[ClassifiedTransaction], config: &EngineConfig) -> TaxInsights {
    let items: Vec<TaxItem> = rows
        .iter()
        .filter(|t| t.is_debit())
        .filter_map(|t| {
            let (name, section) = instrument(&normalize(&t.narration))?;
            Some(TaxItem {
                date: t.date.clone(),
                narration: t.narration.clone(),
                instrument: name,
                section,
                amount: round2(t.amount),
            })
        })
        .collect();

    let used = |section: TaxSection| -> f64 {
        items
            .iter()
            .filter(|i| i.section == section)
            .map(|i| i.amount)
            .sum()
    };
    let used_80c = used(TaxSection::Section80C);
    let used_80d = used(TaxSection::Section80D);
    let headroom_80c = (config.section_80c_cap - used_80c).max(0.0);
    let headroom_80d = (config.section_80d_cap - used_80d).max(0.0);

    let mut missed = Vec::new();
    if used_80c == 0.0 {
        missed.push(format!(
            "No Section 80C investments found (ELSS, PPF, NPS, life insurance); up to {:.0} is deductible",
            config.section_80c_cap
        ));
    } else if headroom_80c > 0.0 {
        missed.push(format!("Section 80C has {headroom_80c:.0} of unused headroom"));
    }
    if used_80d == 0.0 {
        missed.push(format!(
            "No health insurance premium found; Section 80D allows up to {:.0}",
            config.section_80d_cap
        ));
    } else if headroom_80d > 0.0 {
        missed.push(format!("Section 80D has {headroom_80d:.0} of unused headroom"));
    }
    if items.iter().any(|i| i.section == TaxSection::NotQualifying) {
        missed.push("Regular mutual fund SIPs do not qualify; ELSS funds count towards 80C".to_string());
    }

    TaxInsights {
        section_80c_used: round2(used_80c),
        section_80c_cap: config.section_80c_cap,
        section_80c_headroom: round2(headroom_80c),
        section_80d_used: round2(used_80d),
        section_80d_cap: config.section_80d_cap,
        section_80d_headroom: round2(headroom_80d),
        potential_tax_saving: round2((headroom_80c + headroom_80d) * config.tax_bracket),
        items,
        missed_deductions: missed,
    }
}
