use clap::{Parser, ValueEnum};
use unveil_core::{CardConfig, DeviceClass, FadePolicy};
use wasm_bindgen::prelude::*;

mod card;
mod drawables;
mod utils;

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
enum PolicyArg {
    Uniform,
    CoveredOnly,
}

impl From<PolicyArg> for FadePolicy {
    fn from(other: PolicyArg) -> Self {
        match other {
            PolicyArg::Uniform => FadePolicy::Uniform,
            PolicyArg::CoveredOnly => FadePolicy::CoveredOnly,
        }
    }
}

/// Options read from the page location hash, e.g. `#--cell-size=16&--low-resource&-vv`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Edge length of a grid cell, in canvas pixels
    #[arg(long)]
    cell_size: Option<f64>,

    /// Share of cells to uncover before the sequence plays
    #[arg(long)]
    threshold_fraction: Option<f64>,

    /// Use the fixed low-resource threshold even on capable devices
    #[arg(long)]
    low_resource: bool,

    #[arg(long)]
    phase_one_ms: Option<u32>,

    #[arg(long)]
    phase_two_ms: Option<u32>,

    #[arg(long, value_enum)]
    fade_policy: Option<PolicyArg>,
}

impl Args {
    fn from_hash(location_hash: &str) -> Result<Self, clap::Error> {
        Self::try_parse_from(location_hash.split(['#', '&']))
    }

    /// Config for a card of yet unknown canvas size; the view fills in the size on mount.
    fn card_config(&self, constrained_device: bool) -> CardConfig {
        let defaults = CardConfig::default();
        CardConfig {
            cell_size: self.cell_size.unwrap_or(defaults.cell_size),
            threshold_fraction: self
                .threshold_fraction
                .unwrap_or(defaults.threshold_fraction),
            device: if self.low_resource || constrained_device {
                DeviceClass::LowResource
            } else {
                DeviceClass::Standard
            },
            phase_one_ms: self.phase_one_ms.unwrap_or(defaults.phase_one_ms),
            phase_two_ms: self.phase_two_ms.unwrap_or(defaults.phase_two_ms),
            fade_policy: self.fade_policy.map_or(defaults.fade_policy, Into::into),
            ..defaults
        }
    }
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let location_hash = window()
        .location()
        .hash()
        .unwrap_or_else(|_| "".to_string());

    let args = Args::from_hash(&location_hash).expect("Could not parse args");
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }

    let constrained = utils::is_constrained_device();
    let config = args.card_config(constrained);
    log::debug!("constrained device: {}, config: {:?}", constrained, config);

    let root = document()
        .get_element_by_id("card")
        .expect("Could not find id=\"card\" element");
    let props = card::CardProps {
        config,
        photo_src: root.get_attribute("data-photo").unwrap_or_default().into(),
        audio_src: root.get_attribute("data-audio").unwrap_or_default().into(),
    };

    log::debug!("App started");
    yew::Renderer::<card::CardView>::with_root_and_props(root, props).render();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_hash_gives_defaults() {
        let args = Args::from_hash("").unwrap();
        assert_eq!(args.card_config(false), CardConfig::default());
    }

    #[test]
    fn hash_overrides_config() {
        let args = Args::from_hash(
            "#--cell-size=16&--phase-one-ms=1000&--fade-policy=covered-only&-vv",
        )
        .unwrap();
        let config = args.card_config(false);

        assert_eq!(config.cell_size, 16.0);
        assert_eq!(config.phase_one_ms, 1000);
        assert_eq!(config.phase_two_ms, CardConfig::DEFAULT_PHASE_MS);
        assert_eq!(config.fade_policy, FadePolicy::CoveredOnly);
        assert_eq!(config.device, DeviceClass::Standard);
    }

    #[test]
    fn low_resource_from_flag_or_device() {
        let flagged = Args::from_hash("#--low-resource").unwrap();
        assert_eq!(flagged.card_config(false).device, DeviceClass::LowResource);

        let plain = Args::from_hash("").unwrap();
        assert_eq!(plain.card_config(true).device, DeviceClass::LowResource);
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(Args::from_hash("#--no-such-flag").is_err());
    }
}
