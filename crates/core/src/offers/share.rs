use serde::{Deserialize, Serialize};

use crate::domain::offer::OfferDetail;

pub const DEFAULT_SHARE_TITLE: &str = "Offerta Energia";
pub const DEFAULT_SHARE_TEXT: &str = "Scopri questa offerta energia!";
pub const CLIPBOARD_NOTICE: &str = "Link copiato negli appunti!";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl SharePayload {
    pub fn for_offer(detail: Option<&OfferDetail>, url: impl Into<String>) -> Self {
        let title = detail
            .map(|detail| detail.name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_SHARE_TITLE);
        let text = detail
            .map(|detail| detail.description.trim())
            .filter(|description| !description.is_empty())
            .unwrap_or(DEFAULT_SHARE_TEXT);
        Self { title: title.to_owned(), text: text.to_owned(), url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::domain::offer::{OfferDetail, OfferId, PricingType};
    use crate::offers::share::{SharePayload, DEFAULT_SHARE_TEXT, DEFAULT_SHARE_TITLE};

    fn detail(name: &str, description: &str) -> OfferDetail {
        OfferDetail {
            offer_id: OfferId(42),
            market_type: "01".to_owned(),
            client_type: "01".to_owned(),
            pricing_type: PricingType::Fixed,
            single_offer: true,
            name: name.to_owned(),
            description: description.to_owned(),
            duration_months: 24,
            guaranteed: true,
            valid_from: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date"),
            valid_until: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid date"),
        }
    }

    #[test]
    fn payload_defaults_when_detail_is_missing() {
        let payload = SharePayload::for_offer(None, "https://energia.example/offerte/42");

        assert_eq!(payload.title, DEFAULT_SHARE_TITLE);
        assert_eq!(payload.text, DEFAULT_SHARE_TEXT);
        assert_eq!(payload.url, "https://energia.example/offerte/42");
    }

    #[test]
    fn payload_uses_offer_name_and_falls_back_on_blank_description() {
        let offer = detail("Luce Sicura 24", "   ");

        let payload = SharePayload::for_offer(Some(&offer), "https://energia.example/offerte/42");

        assert_eq!(payload.title, "Luce Sicura 24");
        assert_eq!(payload.text, DEFAULT_SHARE_TEXT);
    }
}
