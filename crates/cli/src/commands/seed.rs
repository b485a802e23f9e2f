use crate::commands::{load_config, migrated_pool, runtime, CommandResult, StepFailure};
use energia_db::{CatalogSeedDataset, OfferSeedInfo};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = migrated_pool(&config).await?;

        let seed_result = CatalogSeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
        let verification = CatalogSeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let run_result: Result<Vec<OfferSeedInfo>, StepFailure> = if verification.all_present {
            Ok(seed_result.offers_seeded)
        } else {
            Err(("seed_verification", failed_checks_message(&verification.checks), 6u8))
        };

        pool.close().await;
        run_result
    });

    match result {
        Ok(offers) => {
            let lines: Vec<String> = offers.iter().map(describe_offer).collect();
            CommandResult::success(
                "seed",
                format!(
                    "demo offer catalog loaded for {} offers:\n{}",
                    offers.len(),
                    lines.join("\n")
                ),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn describe_offer(offer: &OfferSeedInfo) -> String {
    format!(
        "  - offer {}: {} ({})",
        offer.offer_id,
        offer.name.unwrap_or("<no detail>"),
        offer.description
    )
}

fn failed_checks_message(checks: &[(&'static str, bool)]) -> String {
    let failed_checks =
        checks.iter().filter_map(|(check, passed)| (!passed).then_some(*check)).collect::<Vec<_>>();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use energia_db::OfferSeedInfo;

    use super::{describe_offer, failed_checks_message};

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let checks = [("offer-42", true), ("offer-7/components", false), ("offer-108/payment-methods", false)];

        assert_eq!(
            failed_checks_message(&checks),
            "Seed verification failed for checks: offer-7/components, offer-108/payment-methods"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        assert_eq!(failed_checks_message(&[("offer-42", true)]), "Some seed data failed to load");
    }

    #[test]
    fn offers_without_detail_are_described_explicitly() {
        let line = describe_offer(&OfferSeedInfo {
            offer_id: 99,
            name: None,
            description: "Registered offer with no detail record",
        });

        assert_eq!(line, "  - offer 99: <no detail> (Registered offer with no detail record)");
    }
}
