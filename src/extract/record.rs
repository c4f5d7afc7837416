//! The fixed record schema extracted from every confirmed profile page

use std::fmt;

/// One extractable field of a firm profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirmName,
    AmLawRank,
    NljRank,
    EquityPartners,
    NonEquityPartners,
    TotalRevenue,
    ProfitPerPartner,
    RevenuePerLawyer,
    TotalHeadcount,
    Description,
}

impl Field {
    /// Returns all fields in spreadsheet column order
    pub fn all() -> [Self; 10] {
        [
            Self::FirmName,
            Self::AmLawRank,
            Self::NljRank,
            Self::EquityPartners,
            Self::NonEquityPartners,
            Self::TotalRevenue,
            Self::ProfitPerPartner,
            Self::RevenuePerLawyer,
            Self::TotalHeadcount,
            Self::Description,
        ]
    }

    /// Returns the spreadsheet column heading
    pub fn column(&self) -> &'static str {
        match self {
            Self::FirmName => "Firm Name",
            Self::AmLawRank => "Am Law 200 Ranking",
            Self::NljRank => "NLJ 500 Ranking",
            Self::EquityPartners => "Equity Partners",
            Self::NonEquityPartners => "Non-Equity Partners",
            Self::TotalRevenue => "Total Revenue",
            Self::ProfitPerPartner => "Profit Per Equity Partner",
            Self::RevenuePerLawyer => "Revenue Per Lawyer",
            Self::TotalHeadcount => "Total Headcount",
            Self::Description => "Firm Description",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Structured data for one firm
///
/// Only the URL is guaranteed; every other field is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirmRecord {
    pub url: String,
    pub firm_name: Option<String>,
    pub amlaw_rank: Option<String>,
    pub nlj_rank: Option<String>,
    pub equity_partners: Option<String>,
    pub non_equity_partners: Option<String>,
    pub total_revenue: Option<String>,
    pub profit_per_partner: Option<String>,
    pub revenue_per_lawyer: Option<String>,
    pub total_headcount: Option<String>,
    pub description: Option<String>,
}

impl FirmRecord {
    /// Creates a record with every field missing
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Returns the fields that could not be extracted
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::all()
            .into_iter()
            .filter(|f| self.get(*f).is_none())
            .collect()
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::FirmName => &self.firm_name,
            Field::AmLawRank => &self.amlaw_rank,
            Field::NljRank => &self.nlj_rank,
            Field::EquityPartners => &self.equity_partners,
            Field::NonEquityPartners => &self.non_equity_partners,
            Field::TotalRevenue => &self.total_revenue,
            Field::ProfitPerPartner => &self.profit_per_partner,
            Field::RevenuePerLawyer => &self.revenue_per_lawyer,
            Field::TotalHeadcount => &self.total_headcount,
            Field::Description => &self.description,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::FirmName => &mut self.firm_name,
            Field::AmLawRank => &mut self.amlaw_rank,
            Field::NljRank => &mut self.nlj_rank,
            Field::EquityPartners => &mut self.equity_partners,
            Field::NonEquityPartners => &mut self.non_equity_partners,
            Field::TotalRevenue => &mut self.total_revenue,
            Field::ProfitPerPartner => &mut self.profit_per_partner,
            Field::RevenuePerLawyer => &mut self.revenue_per_lawyer,
            Field::TotalHeadcount => &mut self.total_headcount,
            Field::Description => &mut self.description,
        }
    }
}
