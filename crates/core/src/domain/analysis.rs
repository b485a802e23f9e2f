use serde::{Deserialize, Serialize};

/// Files above this size get an advisory in the UI; they are still accepted.
pub const ADVISED_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self { name: name.into(), mime_type: mime_type.into(), size_bytes }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == "application/pdf"
    }

    pub fn is_accepted(&self) -> bool {
        self.is_image() || self.is_pdf()
    }

    pub fn exceeds_size_advisory(&self) -> bool {
        self.size_bytes > ADVISED_MAX_FILE_BYTES
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saving {
    pub offer: String,
    pub amount: u32,
    pub description: String,
    pub efficiency: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumption {
    pub current_kwh: u32,
    pub current_spend: u32,
    pub potential_spend: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketComparison {
    pub name: String,
    pub value: u32,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub savings: Vec<Saving>,
    pub matching_offers_count: u32,
    pub consumption: Consumption,
    pub market_comparison: Vec<MarketComparison>,
}

impl AnalysisResult {
    pub fn max_saving(&self) -> u32 {
        self.savings.iter().map(|saving| saving.amount).max().unwrap_or(0)
    }
}
