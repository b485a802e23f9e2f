use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use energia_core::domain::offer::{
    flag_from_code, OfferDetail, OfferId, PaymentMethod, PriceComponent, PriceInterval,
    PricingType, UnitOfMeasure,
};
use energia_core::offers::{CatalogError, OfferCatalog};

use super::RepositoryError;
use crate::DbPool;

pub struct SqlOfferCatalog {
    pool: DbPool,
}

impl SqlOfferCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Offers registered in the primary table, with or without detail.
    pub async fn count_offers(&self) -> Result<i64, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT COUNT(1) FROM offers").fetch_one(&self.pool).await?)
    }

    pub async fn exists(&self, id: OfferId) -> Result<bool, RepositoryError> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM offers WHERE id = ?)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists == 1)
    }

    pub async fn find_detail(&self, id: OfferId) -> Result<Option<OfferDetail>, RepositoryError> {
        let row = sqlx::query(
            "SELECT
                offer_id,
                tipo_mercato,
                offerta_singola,
                tipo_cliente,
                tipo_offerta,
                nome_offerta,
                descrizione,
                durata,
                garanzie,
                data_inizio,
                data_fine
             FROM offer_details
             WHERE offer_id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(detail_from_row).transpose()
    }

    pub async fn list_components(
        &self,
        id: OfferId,
    ) -> Result<Vec<PriceComponent>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT
                c.id,
                c.nome,
                c.descrizione,
                c.tipologia,
                c.macroarea,
                i.fascia_componente,
                i.prezzo,
                i.unita_misura
             FROM price_components c
             LEFT JOIN price_intervals i ON i.component_id = c.id
             WHERE c.offer_id = ?
             ORDER BY c.id ASC, i.position ASC",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut components: Vec<PriceComponent> = Vec::new();
        for row in rows {
            let component_id: i64 = row.try_get("id")?;
            let starts_new = components.last().map(|last| last.id != component_id).unwrap_or(true);
            if starts_new {
                components.push(PriceComponent {
                    id: component_id,
                    name: row.try_get("nome")?,
                    description: row.try_get("descrizione")?,
                    kind: row.try_get("tipologia")?,
                    macro_area: row.try_get("macroarea")?,
                    intervals: Vec::new(),
                });
            }
            if let Some(interval) = interval_from_row(&row)? {
                if let Some(component) = components.last_mut() {
                    component.intervals.push(interval);
                }
            }
        }

        Ok(components)
    }

    pub async fn list_payment_methods(
        &self,
        id: OfferId,
    ) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT modalita_pagamento, descrizione
             FROM payment_methods
             WHERE offer_id = ?
             ORDER BY modalita_pagamento ASC",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<PaymentMethod, RepositoryError> {
                Ok(PaymentMethod {
                    code: row.try_get("modalita_pagamento")?,
                    description: row.try_get("descrizione")?,
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl OfferCatalog for SqlOfferCatalog {
    async fn offer_exists(&self, id: OfferId) -> Result<bool, CatalogError> {
        Ok(self.exists(id).await?)
    }

    async fn offer_detail(&self, id: OfferId) -> Result<Option<OfferDetail>, CatalogError> {
        Ok(self.find_detail(id).await?)
    }

    async fn price_components(&self, id: OfferId) -> Result<Vec<PriceComponent>, CatalogError> {
        Ok(self.list_components(id).await?)
    }

    async fn payment_methods(&self, id: OfferId) -> Result<Vec<PaymentMethod>, CatalogError> {
        Ok(self.list_payment_methods(id).await?)
    }
}

fn detail_from_row(row: SqliteRow) -> Result<OfferDetail, RepositoryError> {
    let duration: i64 = row.try_get("durata")?;
    let duration_months = u32::try_from(duration)
        .map_err(|_| RepositoryError::Decode(format!("invalid durata `{duration}`")))?;
    let pricing_code: String = row.try_get("tipo_offerta")?;
    let single_offer: String = row.try_get("offerta_singola")?;
    let guaranteed: String = row.try_get("garanzie")?;

    Ok(OfferDetail {
        offer_id: OfferId(row.try_get("offer_id")?),
        market_type: row.try_get("tipo_mercato")?,
        client_type: row.try_get("tipo_cliente")?,
        pricing_type: PricingType::from_code(&pricing_code),
        single_offer: flag_from_code(&single_offer),
        name: row.try_get("nome_offerta")?,
        description: row.try_get("descrizione")?,
        duration_months,
        guaranteed: flag_from_code(&guaranteed),
        valid_from: parse_date("data_inizio", row.try_get("data_inizio")?)?,
        valid_until: parse_date("data_fine", row.try_get("data_fine")?)?,
    })
}

/// Components without intervals come back from the join with null interval columns.
fn interval_from_row(row: &SqliteRow) -> Result<Option<PriceInterval>, RepositoryError> {
    let band: Option<String> = row.try_get("fascia_componente")?;
    let Some(band) = band else {
        return Ok(None);
    };
    let price_raw: String = row.try_get("prezzo")?;
    let price = Decimal::from_str(price_raw.trim())
        .map_err(|error| RepositoryError::Decode(format!("invalid prezzo `{price_raw}`: {error}")))?;
    let unit: String = row.try_get("unita_misura")?;

    Ok(Some(PriceInterval { band, price, unit: UnitOfMeasure::from_code(&unit) }))
}

fn parse_date(column: &str, value: String) -> Result<NaiveDate, RepositoryError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|error| RepositoryError::Decode(format!("invalid {column} `{value}`: {error}")))
}
