use super::matrix::Normalization;
use super::nmf::NmfOptions;
use super::ranking::DistanceMetric;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FusionMethod {
    #[default]
    Nmf,
    Pca,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionOptions {
    pub method: FusionMethod,
    pub normalization: Normalization,
    pub distance: DistanceMetric,
    /// Number of ranked ion images reported.
    pub top_n: usize,
    /// NMF settings; `nmf.n_components` is also the PCA component count.
    pub nmf: NmfOptions,
}

impl Default for FusionOptions {
    fn default() -> Self {
        Self {
            method: FusionMethod::default(),
            normalization: Normalization::default(),
            distance: DistanceMetric::default(),
            top_n: 10,
            nmf: NmfOptions::default(),
        }
    }
}
