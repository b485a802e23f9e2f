use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Expected shape of every offer in the demo catalog seed.
const SEED_OFFERS: &[SeedOfferContract] = &[
    SeedOfferContract {
        offer_id: 42,
        label: "offer-42",
        name: Some("Luce Sicura 24"),
        component_count: 2,
        interval_count: 2,
        payment_codes: &["01"],
        description: "Electricity, fixed price, two components, bank transfer",
    },
    SeedOfferContract {
        offer_id: 7,
        label: "offer-7",
        name: Some("Gas Mercato Flex"),
        component_count: 1,
        interval_count: 2,
        payment_codes: &["03", "04"],
        description: "Gas, variable price, two bands on one component",
    },
    SeedOfferContract {
        offer_id: 108,
        label: "offer-108",
        name: Some("Business Default"),
        component_count: 0,
        interval_count: 0,
        payment_codes: &["99"],
        description: "Business default service without price components",
    },
    SeedOfferContract {
        offer_id: 99,
        label: "offer-99",
        name: None,
        component_count: 0,
        interval_count: 0,
        payment_codes: &[],
        description: "Registered offer with no detail record",
    },
];

/// Deterministic demo catalog used by local runs and handler tests.
pub struct CatalogSeedDataset;

impl CatalogSeedDataset {
    pub const SQL: &str = include_str!("../../../config/fixtures/offer_catalog_seed.sql");

    /// Loads the seed inside one transaction. Loading twice leaves the same rows.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let offers_seeded = SEED_OFFERS
            .iter()
            .map(|offer| OfferSeedInfo {
                offer_id: offer.offer_id,
                name: offer.name,
                description: offer.description,
            })
            .collect();

        Ok(SeedResult { offers_seeded })
    }

    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for offer in SEED_OFFERS {
            let exists: i64 =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM offers WHERE id = ?1)")
                    .bind(offer.offer_id)
                    .fetch_one(pool)
                    .await?;
            checks.push((offer.label, exists == 1));

            let name: Option<String> =
                sqlx::query_scalar("SELECT nome_offerta FROM offer_details WHERE offer_id = ?1")
                    .bind(offer.offer_id)
                    .fetch_optional(pool)
                    .await?;
            checks.push(("detail", name.as_deref() == offer.name));

            let component_count: i64 =
                sqlx::query_scalar("SELECT COUNT(1) FROM price_components WHERE offer_id = ?1")
                    .bind(offer.offer_id)
                    .fetch_one(pool)
                    .await?;
            checks.push(("components", component_count == offer.component_count));

            let interval_count: i64 = sqlx::query_scalar(
                "SELECT COUNT(1)
                 FROM price_intervals i
                 JOIN price_components c ON c.id = i.component_id
                 WHERE c.offer_id = ?1",
            )
            .bind(offer.offer_id)
            .fetch_one(pool)
            .await?;
            checks.push(("intervals", interval_count == offer.interval_count));

            let payment_codes: Vec<String> = sqlx::query_scalar(
                "SELECT modalita_pagamento FROM payment_methods
                 WHERE offer_id = ?1 ORDER BY modalita_pagamento",
            )
            .bind(offer.offer_id)
            .fetch_all(pool)
            .await?;
            checks.push(("payment-methods", string_list_matches(&payment_codes, offer.payment_codes)));
        }

        let all_present = checks.iter().all(|(_, ok)| *ok);
        Ok(VerificationResult { all_present, checks })
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedOfferContract {
    offer_id: i64,
    label: &'static str,
    name: Option<&'static str>,
    component_count: i64,
    interval_count: i64,
    payment_codes: &'static [&'static str],
    description: &'static str,
}

fn string_list_matches(actual: &[String], expected: &[&str]) -> bool {
    actual.len() == expected.len() && actual.iter().zip(expected).all(|(a, b)| a == b)
}

#[derive(Debug)]
pub struct SeedResult {
    pub offers_seeded: Vec<OfferSeedInfo>,
}

#[derive(Debug)]
pub struct OfferSeedInfo {
    pub offer_id: i64,
    pub name: Option<&'static str>,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
