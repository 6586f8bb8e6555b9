//! Declarative tag-resolution table.
//!
//! No two filers use identical tag names for the same concept: US-GAAP,
//! IFRS and extension taxonomies coexist, so each canonical metric lists its
//! candidate local names in priority order. Matching is namespace-prefix
//! blind.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// First candidate with a usable fact wins.
    FirstMatch,
    /// Every candidate present contributes to an independent total, e.g.
    /// total debt = long-term + short-term, not one replacing the other.
    Sum,
}

#[derive(Debug)]
pub struct MetricSpec {
    pub metric: &'static str,
    pub candidates: &'static [&'static str],
    pub mode: Aggregation,
}

pub static METRIC_SPECS: &[MetricSpec] = &[
    MetricSpec {
        metric: "Revenue",
        candidates: &[
            "Revenues",
            "RevenueFromContractWithCustomerExcludingAssessedTax",
            "SalesRevenueNet",
            "Revenue",
        ],
        mode: Aggregation::FirstMatch,
    },
    MetricSpec {
        metric: "NetIncome",
        candidates: &[
            "NetIncomeLoss",
            "ProfitLoss",
            "NetIncomeLossAvailableToCommonStockholdersBasic",
        ],
        mode: Aggregation::FirstMatch,
    },
    MetricSpec {
        metric: "TotalAssets",
        candidates: &["Assets"],
        mode: Aggregation::FirstMatch,
    },
    MetricSpec {
        metric: "TotalLiabilities",
        candidates: &["Liabilities"],
        mode: Aggregation::FirstMatch,
    },
    MetricSpec {
        metric: "OperatingCashFlow",
        candidates: &[
            "NetCashProvidedByUsedInOperatingActivities",
            "CashFlowsFromOperatingActivities",
            "CashFlowsFromUsedInOperatingActivities",
        ],
        mode: Aggregation::FirstMatch,
    },
    MetricSpec {
        metric: "CurrentAssets",
        candidates: &["AssetsCurrent", "CurrentAssets"],
        mode: Aggregation::FirstMatch,
    },
    MetricSpec {
        metric: "CurrentLiabilities",
        candidates: &["LiabilitiesCurrent", "CurrentLiabilities"],
        mode: Aggregation::FirstMatch,
    },
    MetricSpec {
        metric: "StockholdersEquity",
        candidates: &[
            "StockholdersEquity",
            "Equity",
            "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
        ],
        mode: Aggregation::FirstMatch,
    },
    MetricSpec {
        metric: "Debt",
        candidates: &["LongTermDebtNoncurrent", "DebtCurrent", "ShortTermBorrowings"],
        mode: Aggregation::Sum,
    },
    MetricSpec {
        metric: "EarningsPerShareBasic",
        candidates: &["EarningsPerShareBasic", "BasicEarningsLossPerShare"],
        mode: Aggregation::FirstMatch,
    },
];

pub fn spec_for(metric: &str) -> Option<&'static MetricSpec> {
    METRIC_SPECS.iter().find(|s| s.metric == metric)
}
