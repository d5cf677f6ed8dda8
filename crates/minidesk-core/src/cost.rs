//! Living-cost calculator.
//!
//! A [`CostModel`] holds the raw inputs of a tenancy (deposit, recurring
//! monthly costs, one-off setup cost, duration and monthly income) and
//! derives the summary figures on demand. There is no hidden state: every
//! call to [`CostModel::derive`] recomputes from the current inputs.
//!
//! Input is never rejected. Non-numeric, non-finite or negative amounts are
//! stored as `0`, and the duration is rounded and clamped to
//! [`MIN_MONTHS`]..=[`MAX_MONTHS`].

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::events::Event;

pub const MIN_MONTHS: u32 = 1;
pub const MAX_MONTHS: u32 = 48;

/// Quick-pick durations offered next to the months slider.
pub const MONTH_PRESETS: [u32; 5] = [6, 12, 24, 36, 48];

/// A named input amount of the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostField {
    Deposit,
    MonthlyRent,
    Maintenance,
    Utilities,
    Groceries,
    Transport,
    Internet,
    Other,
    SetupCost,
}

impl CostField {
    pub const ALL: [CostField; 9] = [
        CostField::Deposit,
        CostField::MonthlyRent,
        CostField::Maintenance,
        CostField::Utilities,
        CostField::Groceries,
        CostField::Transport,
        CostField::Internet,
        CostField::Other,
        CostField::SetupCost,
    ];

    /// Fields that recur every month and make up the monthly base.
    pub const RECURRING: [CostField; 7] = [
        CostField::MonthlyRent,
        CostField::Maintenance,
        CostField::Utilities,
        CostField::Groceries,
        CostField::Transport,
        CostField::Internet,
        CostField::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CostField::Deposit => "deposit",
            CostField::MonthlyRent => "monthly_rent",
            CostField::Maintenance => "maintenance",
            CostField::Utilities => "utilities",
            CostField::Groceries => "groceries",
            CostField::Transport => "transport",
            CostField::Internet => "internet",
            CostField::Other => "other",
            CostField::SetupCost => "setup_cost",
        }
    }

    pub fn is_recurring(&self) -> bool {
        Self::RECURRING.contains(self)
    }
}

impl fmt::Display for CostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CostField {
    type Err = ValidationError;

    /// Accepts snake_case and camelCase names, plus the short `rent`/`setup`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "deposit" => Ok(CostField::Deposit),
            "monthlyrent" | "rent" => Ok(CostField::MonthlyRent),
            "maintenance" => Ok(CostField::Maintenance),
            "utilities" => Ok(CostField::Utilities),
            "groceries" => Ok(CostField::Groceries),
            "transport" => Ok(CostField::Transport),
            "internet" => Ok(CostField::Internet),
            "other" => Ok(CostField::Other),
            "setupcost" | "setup" => Ok(CostField::SetupCost),
            _ => Err(ValidationError::UnknownField(s.to_string())),
        }
    }
}

/// Raw amounts entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostInputs {
    #[serde(default)]
    pub deposit: f64,
    #[serde(default)]
    pub monthly_rent: f64,
    #[serde(default)]
    pub maintenance: f64,
    #[serde(default)]
    pub utilities: f64,
    #[serde(default)]
    pub groceries: f64,
    #[serde(default)]
    pub transport: f64,
    #[serde(default)]
    pub internet: f64,
    #[serde(default)]
    pub other: f64,
    #[serde(default)]
    pub setup_cost: f64,
}

impl CostInputs {
    /// All amounts zero.
    pub fn zeroed() -> Self {
        Self {
            deposit: 0.0,
            monthly_rent: 0.0,
            maintenance: 0.0,
            utilities: 0.0,
            groceries: 0.0,
            transport: 0.0,
            internet: 0.0,
            other: 0.0,
            setup_cost: 0.0,
        }
    }

    pub fn get(&self, field: CostField) -> f64 {
        match field {
            CostField::Deposit => self.deposit,
            CostField::MonthlyRent => self.monthly_rent,
            CostField::Maintenance => self.maintenance,
            CostField::Utilities => self.utilities,
            CostField::Groceries => self.groceries,
            CostField::Transport => self.transport,
            CostField::Internet => self.internet,
            CostField::Other => self.other,
            CostField::SetupCost => self.setup_cost,
        }
    }

    fn slot_mut(&mut self, field: CostField) -> &mut f64 {
        match field {
            CostField::Deposit => &mut self.deposit,
            CostField::MonthlyRent => &mut self.monthly_rent,
            CostField::Maintenance => &mut self.maintenance,
            CostField::Utilities => &mut self.utilities,
            CostField::Groceries => &mut self.groceries,
            CostField::Transport => &mut self.transport,
            CostField::Internet => &mut self.internet,
            CostField::Other => &mut self.other,
            CostField::SetupCost => &mut self.setup_cost,
        }
    }

    /// Copy with every amount passed through [`coerce_amount`].
    fn sanitized(mut self) -> Self {
        for field in CostField::ALL {
            let slot = self.slot_mut(field);
            *slot = coerce_amount(*slot);
        }
        self
    }
}

impl Default for CostInputs {
    fn default() -> Self {
        Self {
            deposit: 500.0,
            monthly_rent: 55.0,
            maintenance: 8.0,
            utilities: 6.0,
            groceries: 35.0,
            transport: 6.0,
            internet: 3.0,
            other: 5.0,
            setup_cost: 40.0,
        }
    }
}

/// Figures derived from a [`CostModel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Sum of the recurring monthly fields.
    pub monthly_base: f64,
    /// Setup cost spread over the tenancy.
    pub amortized_setup: f64,
    /// Money gone by the end of the tenancy. The deposit is assumed refunded.
    pub total_spent: f64,
    /// Cash needed up front: deposit, setup and the first month.
    pub initial_cash_need: f64,
    /// Income minus effective monthly cost. Non-negative is a surplus.
    pub monthly_delta: f64,
    /// Total spent minus total income. Non-positive is a surplus.
    pub period_delta: f64,
}

impl CostBreakdown {
    pub fn monthly_balance(&self) -> Balance {
        if self.monthly_delta >= 0.0 {
            Balance::Surplus
        } else {
            Balance::Shortfall
        }
    }

    pub fn period_balance(&self) -> Balance {
        if self.period_delta <= 0.0 {
            Balance::Surplus
        } else {
            Balance::Shortfall
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Balance {
    Surplus,
    Shortfall,
}

impl Balance {
    pub fn label(&self) -> &'static str {
        match self {
            Balance::Surplus => "surplus",
            Balance::Shortfall => "shortfall",
        }
    }
}

/// Living-cost calculator state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    inputs: CostInputs,
    months: u32,
    monthly_income: f64,
}

impl CostModel {
    /// Build a model, coercing amounts and clamping the duration.
    pub fn new(inputs: CostInputs, months: f64, monthly_income: f64) -> Self {
        Self {
            inputs: inputs.sanitized(),
            months: clamp_months(months),
            monthly_income: coerce_amount(monthly_income),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn inputs(&self) -> &CostInputs {
        &self.inputs
    }

    pub fn field(&self, field: CostField) -> f64 {
        self.inputs.get(field)
    }

    pub fn months(&self) -> u32 {
        self.months
    }

    pub fn monthly_income(&self) -> f64 {
        self.monthly_income
    }

    pub fn income_total(&self) -> f64 {
        self.monthly_income * f64::from(self.months)
    }

    pub fn derive(&self) -> CostBreakdown {
        let months = f64::from(self.months);
        let monthly_base: f64 = CostField::RECURRING
            .iter()
            .map(|f| self.inputs.get(*f))
            .sum();
        let setup = self.inputs.setup_cost;
        let amortized_setup = setup / months.max(1.0);
        let total_spent = monthly_base * months + setup;

        CostBreakdown {
            monthly_base,
            amortized_setup,
            total_spent,
            initial_cash_need: self.inputs.deposit + setup + monthly_base,
            monthly_delta: self.monthly_income - (monthly_base + amortized_setup),
            period_delta: total_spent - self.income_total(),
        }
    }

    pub fn snapshot(&self) -> Event {
        Event::CostSnapshot {
            inputs: self.inputs,
            months: self.months,
            monthly_income: self.monthly_income,
            breakdown: self.derive(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Store an amount; returns the value actually stored.
    pub fn set_field(&mut self, field: CostField, value: f64) -> f64 {
        let stored = coerce_amount(value);
        *self.inputs.slot_mut(field) = stored;
        debug!(%field, stored, "cost field updated");
        stored
    }

    /// Store an amount typed as text. Unparseable text stores `0`.
    pub fn set_field_str(&mut self, field: CostField, raw: &str) -> f64 {
        self.set_field(field, parse_amount(raw))
    }

    pub fn set_income(&mut self, value: f64) -> f64 {
        self.monthly_income = coerce_amount(value);
        self.monthly_income
    }

    /// Round and clamp the tenancy duration; returns the stored months.
    pub fn set_duration(&mut self, months: f64) -> u32 {
        self.months = clamp_months(months);
        debug!(months = self.months, "cost duration updated");
        self.months
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            inputs: CostInputs::default(),
            months: 12,
            monthly_income: 40.0,
        }
    }
}

/// Non-finite and negative amounts become `0`.
pub fn coerce_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Parse user text into an amount, `0` when it is not a number.
pub fn parse_amount(raw: &str) -> f64 {
    raw.trim().parse::<f64>().map(coerce_amount).unwrap_or(0.0)
}

fn clamp_months(months: f64) -> u32 {
    if !months.is_finite() {
        return MIN_MONTHS;
    }
    months.round().clamp(f64::from(MIN_MONTHS), f64::from(MAX_MONTHS)) as u32
}

/// Round to a whole amount and group thousands: `1456.4` -> `"1,456"`.
pub fn format_amount(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
