use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::domain::analysis::{
    AnalysisResult, Consumption, MarketComparison, Saving, SelectedFile,
};

pub const ENERGY_FACTS: [&str; 7] = [
    "Spegnere le luci quando esci da una stanza può farti risparmiare fino al 15% sulla bolletta.",
    "Un frigorifero di classe A+++ consuma il 60% in meno rispetto a uno di classe B.",
    "Le lampadine LED consumano l'80% in meno di quelle tradizionali.",
    "Il riscaldamento rappresenta il 70% dei consumi energetici domestici.",
    "Un rubinetto che gocciola può sprecare fino a 6 litri d'acqua al giorno.",
    "Una doccia di 5 minuti consuma 1/3 dell'acqua di un bagno.",
    "Abbassare di 1°C il termostato riduce i consumi del 7%.",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub percent: u8,
    pub fact: String,
}

pub trait ProgressSink: Send + Sync {
    fn publish(&self, update: ProgressUpdate);
}

#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Runs to completion. Progress is published in non-decreasing order and ends at 100.
    async fn run(&self, files: &[SelectedFile], progress: &dyn ProgressSink) -> AnalysisResult;
}

/// Fixed-step progress with random facts, ending in a canned result.
#[derive(Clone, Debug)]
pub struct SimulatedAnalysisEngine {
    tick: Duration,
    step: u8,
}

impl SimulatedAnalysisEngine {
    pub fn new(tick: Duration, step: u8) -> Self {
        Self { tick, step: step.clamp(1, 100) }
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    pub fn step(&self) -> u8 {
        self.step
    }

    /// Percentages visited by a run: 0, step, 2*step, ... and always 100 last.
    pub fn schedule(&self) -> Vec<u8> {
        let mut percents: Vec<u8> = (0..=100u8).step_by(usize::from(self.step)).collect();
        if percents.last() != Some(&100) {
            percents.push(100);
        }
        percents
    }
}

impl Default for SimulatedAnalysisEngine {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 20)
    }
}

#[async_trait]
impl AnalysisEngine for SimulatedAnalysisEngine {
    async fn run(&self, _files: &[SelectedFile], progress: &dyn ProgressSink) -> AnalysisResult {
        // Sleep first: the result follows the 100% update without an extra tick.
        for percent in self.schedule() {
            if !self.tick.is_zero() {
                tokio::time::sleep(self.tick).await;
            }
            progress.publish(ProgressUpdate { percent, fact: random_fact().to_owned() });
        }
        simulated_result()
    }
}

pub fn random_fact() -> &'static str {
    ENERGY_FACTS.choose(&mut rand::thread_rng()).copied().unwrap_or(ENERGY_FACTS[0])
}

pub fn simulated_result() -> AnalysisResult {
    AnalysisResult {
        savings: vec![
            Saving {
                offer: "Offerta Green".to_owned(),
                amount: 150,
                description: "Energia 100% rinnovabile".to_owned(),
                efficiency: 95,
            },
            Saving {
                offer: "Offerta Luce Smart".to_owned(),
                amount: 120,
                description: "Tariffa bi-oraria automatica".to_owned(),
                efficiency: 88,
            },
            Saving {
                offer: "Offerta Gas Promo".to_owned(),
                amount: 100,
                description: "Prezzo bloccato per 12 mesi".to_owned(),
                efficiency: 82,
            },
        ],
        matching_offers_count: 25,
        consumption: Consumption { current_kwh: 2800, current_spend: 1800, potential_spend: 1450 },
        market_comparison: vec![
            MarketComparison {
                name: "La tua offerta".to_owned(),
                value: 180,
                color: "#ef4444".to_owned(),
            },
            MarketComparison {
                name: "Media mercato".to_owned(),
                value: 220,
                color: "#6b7280".to_owned(),
            },
            MarketComparison {
                name: "Migliore offerta".to_owned(),
                value: 150,
                color: "#22c55e".to_owned(),
            },
        ],
    }
}
