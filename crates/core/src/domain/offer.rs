use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub i64);

impl OfferId {
    /// Parses a path segment; anything that is not a positive integer is not an offer id.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().filter(|id| *id > 0).map(Self)
    }
}

impl std::fmt::Display for OfferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    Fixed,
    Variable,
}

impl PricingType {
    pub fn from_code(code: &str) -> Self {
        if code == "02" {
            Self::Variable
        } else {
            Self::Fixed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fixed => "Fissa",
            Self::Variable => "Variabile",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitOfMeasure {
    PerYear,
    PerKwh,
}

impl UnitOfMeasure {
    pub fn from_code(code: &str) -> Self {
        if code == "01" {
            Self::PerYear
        } else {
            Self::PerKwh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PerYear => "anno",
            Self::PerKwh => "kWh",
        }
    }
}

pub fn market_type_label(code: &str) -> &str {
    match code {
        "01" => "Mercato Libero",
        "02" => "Tutela Graduale",
        "03" => "Servizio di Default",
        other => other,
    }
}

pub fn client_type_label(code: &str) -> &str {
    match code {
        "01" => "Domestico",
        "02" => "Business",
        other => other,
    }
}

pub fn payment_method_label(code: &str) -> &str {
    match code {
        "01" => "Bonifico Bancario",
        "02" => "Carta di Credito",
        "03" => "Addebito Diretto",
        "04" => "PayPal",
        "99" => "Altro",
        other => other,
    }
}

/// Stored flags use `SI` for yes.
pub fn flag_from_code(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case("SI")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferDetail {
    pub offer_id: OfferId,
    pub market_type: String,
    pub client_type: String,
    pub pricing_type: PricingType,
    pub single_offer: bool,
    pub name: String,
    pub description: String,
    pub duration_months: u32,
    pub guaranteed: bool,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
}

impl OfferDetail {
    pub fn market_label(&self) -> &str {
        market_type_label(&self.market_type)
    }

    pub fn client_label(&self) -> &str {
        client_type_label(&self.client_type)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInterval {
    pub band: String,
    pub price: Decimal,
    pub unit: UnitOfMeasure,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceComponent {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub kind: String,
    pub macro_area: String,
    pub intervals: Vec<PriceInterval>,
}

impl PriceComponent {
    /// Headline price shown next to the component name.
    pub fn headline(&self) -> Option<&PriceInterval> {
        self.intervals.first()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub code: String,
    pub description: Option<String>,
}

impl PaymentMethod {
    pub fn label(&self) -> &str {
        payment_method_label(&self.code)
    }
}

/// Everything the offer page needs, assembled in one pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferView {
    pub detail: OfferDetail,
    pub components: Vec<PriceComponent>,
    pub payment_methods: Vec<PaymentMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_id_parse_rejects_non_numeric_and_non_positive() {
        assert_eq!(OfferId::parse("42"), Some(OfferId(42)));
        assert_eq!(OfferId::parse(" 7 "), Some(OfferId(7)));
        assert_eq!(OfferId::parse("0"), None);
        assert_eq!(OfferId::parse("-3"), None);
        assert_eq!(OfferId::parse("abc"), None);
    }

    #[test]
    fn known_codes_map_to_labels_and_unknown_codes_pass_through() {
        assert_eq!(market_type_label("01"), "Mercato Libero");
        assert_eq!(market_type_label("07"), "07");
        assert_eq!(client_type_label("02"), "Business");
        assert_eq!(payment_method_label("01"), "Bonifico Bancario");
        assert_eq!(payment_method_label("99"), "Altro");
        assert_eq!(payment_method_label("XX"), "XX");
        assert_eq!(PricingType::from_code("02"), PricingType::Variable);
        assert_eq!(PricingType::from_code("01"), PricingType::Fixed);
        assert_eq!(UnitOfMeasure::from_code("01").label(), "anno");
        assert_eq!(UnitOfMeasure::from_code("03").label(), "kWh");
        assert!(flag_from_code("SI"));
        assert!(!flag_from_code("NO"));
    }
}
