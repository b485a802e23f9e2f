use serde::{Deserialize, Serialize};

use crate::domain::profile::Profile;
use crate::wizard::questionnaire::QuestionnaireDefinition;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricePlan {
    Fisso,
    Variabile,
}

impl PricePlan {
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Fisso => "Prezzo Fisso",
            Self::Variabile => "Prezzo Variabile",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferFeature {
    Green,
    PrezzoFisso,
    PrezzoVariabile,
    Domiciliazione,
    BonusAttivazione,
}

impl OfferFeature {
    pub fn label(&self, duration_months: u32) -> String {
        match self {
            Self::Green => "Energia 100% rinnovabile".to_owned(),
            Self::PrezzoFisso => format!("Prezzo bloccato per {duration_months} mesi"),
            Self::PrezzoVariabile => "Prezzo aggiornato mensilmente".to_owned(),
            Self::Domiciliazione => "Domiciliazione bancaria inclusa".to_owned(),
            Self::BonusAttivazione => "Bonus di benvenuto incluso".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedOffer {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub plan: PricePlan,
    pub annual_price_eur: u32,
    pub duration_months: u32,
    pub features: Vec<OfferFeature>,
}

impl RecommendedOffer {
    pub fn feature_labels(&self) -> Vec<String> {
        self.features.iter().map(|feature| feature.label(self.duration_months)).collect()
    }
}

/// Produces the offers shown on the results page, best first.
pub trait OfferMatcher: Send + Sync {
    fn rank(&self, profile: &Profile) -> Vec<RecommendedOffer>;
}

/// Returns the same three offers for every profile.
#[derive(Clone, Debug, Default)]
pub struct StaticOfferMatcher;

impl OfferMatcher for StaticOfferMatcher {
    fn rank(&self, _profile: &Profile) -> Vec<RecommendedOffer> {
        vec![
            RecommendedOffer {
                id: 1,
                name: "Energia Verde Fix".to_owned(),
                description: "Tariffa fissa con energia 100% rinnovabile".to_owned(),
                plan: PricePlan::Fisso,
                annual_price_eur: 1250,
                duration_months: 24,
                features: vec![
                    OfferFeature::Green,
                    OfferFeature::PrezzoFisso,
                    OfferFeature::Domiciliazione,
                ],
            },
            RecommendedOffer {
                id: 2,
                name: "Flex Power".to_owned(),
                description: "Tariffa variabile con prezzi di mercato".to_owned(),
                plan: PricePlan::Variabile,
                annual_price_eur: 1180,
                duration_months: 12,
                features: vec![OfferFeature::PrezzoVariabile, OfferFeature::Domiciliazione],
            },
            RecommendedOffer {
                id: 3,
                name: "Super Green Plus".to_owned(),
                description: "La migliore offerta per l'ambiente".to_owned(),
                plan: PricePlan::Fisso,
                annual_price_eur: 1320,
                duration_months: 24,
                features: vec![
                    OfferFeature::Green,
                    OfferFeature::PrezzoFisso,
                    OfferFeature::BonusAttivazione,
                ],
            },
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfileHighlight {
    pub title: &'static str,
    pub value: String,
}

const HIGHLIGHTED_ANSWERS: [(&str, &str); 2] =
    [("consumo_annuo", "Consumo annuo"), ("utilizzo_principale", "Utilizzo principale")];

/// Profile answers echoed back under the offers, rendered with option labels.
pub fn profile_highlights<Q>(questionnaire: &Q, profile: &Profile) -> Vec<ProfileHighlight>
where
    Q: QuestionnaireDefinition + ?Sized,
{
    HIGHLIGHTED_ANSWERS
        .iter()
        .map(|&(question_id, title)| {
            let value = match profile.get(question_id) {
                Some(answer) => questionnaire
                    .questions()
                    .iter()
                    .find(|question| question.id.0 == question_id)
                    .map(|question| question.answer_label(answer).to_owned())
                    .unwrap_or_else(|| answer.to_owned()),
                None => "Non indicato".to_owned(),
            };
            ProfileHighlight { title, value }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::domain::profile::Profile;
    use crate::offers::matching::{
        profile_highlights, OfferFeature, OfferMatcher, PricePlan, StaticOfferMatcher,
    };
    use crate::wizard::questionnaire::EnergyQuestionnaire;

    #[test]
    fn static_matcher_returns_three_offers_regardless_of_profile() {
        let matcher = StaticOfferMatcher;
        let empty = matcher.rank(&Profile::new());
        let answered = matcher.rank(&Profile::from_query("consumo_annuo=ALTO&energia_verde=NO"));

        assert_eq!(empty, answered);
        assert_eq!(empty.len(), 3);
        assert_eq!(empty[0].name, "Energia Verde Fix");
        assert_eq!(empty[0].annual_price_eur, 1250);
        assert_eq!(empty[1].plan, PricePlan::Variabile);
    }

    #[test]
    fn feature_labels_use_contract_duration() {
        let offers = StaticOfferMatcher.rank(&Profile::new());

        assert_eq!(
            offers[0].feature_labels(),
            vec![
                "Energia 100% rinnovabile",
                "Prezzo bloccato per 24 mesi",
                "Domiciliazione bancaria inclusa",
            ]
        );
        assert_eq!(OfferFeature::BonusAttivazione.label(12), "Bonus di benvenuto incluso");
    }

    #[test]
    fn highlights_translate_option_ids_and_flag_missing_answers() {
        let questionnaire = EnergyQuestionnaire::default();
        let profile = Profile::from_query("consumo_annuo=MEDIO");

        let highlights = profile_highlights(&questionnaire, &profile);

        assert_eq!(highlights[0].title, "Consumo annuo");
        assert_eq!(highlights[0].value, "2700-4500 kWh");
        assert_eq!(highlights[1].value, "Non indicato");
    }

    #[test]
    fn unknown_answers_are_shown_verbatim() {
        let questionnaire = EnergyQuestionnaire::default();
        let profile = Profile::from_query("utilizzo_principale=NOTTURNO");

        let highlights = profile_highlights(&questionnaire, &profile);

        assert_eq!(highlights[1].value, "NOTTURNO");
    }
}
