pub mod config;
pub mod design;
pub mod error;
pub mod lookup;
pub mod recommend;
pub mod sample_size;
pub mod variability;

pub use crate::config::{Config, ConfigError};
pub use crate::design::{classify, DesignChoice, DesignRegimen};
pub use crate::error::{BeDesignError, InputError};
pub use crate::recommend::{AnalysisReport, AnalysisRequest, Phase, Recommendation, Recommender};
pub use crate::sample_size::{compute, SampleSizeOptions, SampleSizeResult};
pub use crate::variability::{CvSource, ReferenceTable, Resolver, VariabilityEstimate};

pub mod prelude {
    pub mod lookup {
        pub use crate::lookup::{
            run_lookups, DrugMetadata, LiteratureResult, LiteratureSource, LookupError,
            LookupOutcome, LookupResults, LookupSet, LookupTimeouts, RegisteredProduct,
            RegistryResult, RegistrySource, VendorSource,
        };
    }
    pub mod variability {
        pub use crate::variability::{
            extract_cvintra, extract_pk_parameters, Article, ExtractedValue, PkParameters,
        };
    }

    pub use crate::config::Config;
    pub use crate::design::{classify, DesignChoice, DesignRegimen};
    pub use crate::error::{BeDesignError, InputError};
    pub use crate::recommend::{
        AnalysisReport, AnalysisRequest, Phase, Recommendation, Recommender, ReportOutput,
    };
    pub use crate::sample_size::{
        compute, compute_for_choice, sample_size_table, SampleSizeError, SampleSizeOptions,
        SampleSizeResult,
    };
    pub use crate::variability::{CvSource, ReferenceTable, Resolver, VariabilityEstimate};
}
