//! UI control block and run configuration
//!
//! `Controls` is the set of named inputs a front end writes (sliders, toggles,
//! stage buttons). Every simulation reads only the fields it cares about.
//! `Settings` wraps the controls with the seed and run length used by the
//! headless runner, and loads from JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LabError, LabResult};

/// Which teaching simulation to mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    #[default]
    Enzyme,
    Membrane,
    GeneRegulation,
    AtpSynthase,
    ProteinSynthesis,
    Mutation,
}

impl SimulationKind {
    pub const ALL: [SimulationKind; 6] = [
        SimulationKind::Enzyme,
        SimulationKind::Membrane,
        SimulationKind::GeneRegulation,
        SimulationKind::AtpSynthase,
        SimulationKind::ProteinSynthesis,
        SimulationKind::Mutation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationKind::Enzyme => "enzyme",
            SimulationKind::Membrane => "membrane",
            SimulationKind::GeneRegulation => "gene",
            SimulationKind::AtpSynthase => "atp",
            SimulationKind::ProteinSynthesis => "protein",
            SimulationKind::Mutation => "mutation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "enzyme" | "enzymes" => Some(SimulationKind::Enzyme),
            "membrane" => Some(SimulationKind::Membrane),
            "gene" | "gene_regulation" => Some(SimulationKind::GeneRegulation),
            "atp" | "atp_synthase" => Some(SimulationKind::AtpSynthase),
            "protein" | "protein_synthesis" => Some(SimulationKind::ProteinSynthesis),
            "mutation" => Some(SimulationKind::Mutation),
            _ => None,
        }
    }

    /// Display title
    pub fn title(&self) -> &'static str {
        match self {
            SimulationKind::Enzyme => "Enzyme Kinetics",
            SimulationKind::Membrane => "Membrane Transport",
            SimulationKind::GeneRegulation => "Gene Regulation",
            SimulationKind::AtpSynthase => "ATP Synthase",
            SimulationKind::ProteinSynthesis => "Protein Synthesis",
            SimulationKind::Mutation => "DNA Mutation",
        }
    }
}

/// Radiation source used by the mutation simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RadiationType {
    #[default]
    Alpha,
    Beta,
    Gamma,
}

impl RadiationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RadiationType::Alpha => "alpha",
            RadiationType::Beta => "beta",
            RadiationType::Gamma => "gamma",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "alpha" | "a" => Some(RadiationType::Alpha),
            "beta" | "b" => Some(RadiationType::Beta),
            "gamma" | "g" => Some(RadiationType::Gamma),
            _ => None,
        }
    }

    /// Collision radius of one particle
    pub fn radius(&self) -> f32 {
        match self {
            RadiationType::Alpha => 0.4,
            RadiationType::Beta => 0.15,
            RadiationType::Gamma => 0.1,
        }
    }

    /// Downward speed (negative y, units/s)
    pub fn fall_speed(&self) -> f32 {
        match self {
            RadiationType::Alpha => -4.0,
            RadiationType::Beta => -8.0,
            RadiationType::Gamma => -15.0,
        }
    }
}

/// Enzyme kinetics progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EnzymeStage {
    /// Substrate only
    #[default]
    Substrate,
    /// Competitive inhibitors added
    Inhibition,
}

/// Protein synthesis progression
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProteinStage {
    /// Nucleus: polymerase reads DNA into mRNA
    #[default]
    Transcription,
    /// Cytoplasm: ribosome turns mRNA into protein
    Translation,
}

/// Named UI inputs. Values outside their documented ranges are clamped by
/// [`Controls::sanitized`] before a simulation sees them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    /// Substrate molecules in the enzyme dish, 1..=50
    pub substrate_count: u32,
    /// Inhibitor molecules once inhibition is enabled, 0..=20
    pub inhibitor_count: u32,
    /// Extracellular ions, 1..=50
    pub ion_count: u32,
    /// Membrane channel state
    pub gate_open: bool,
    /// Lactose concentration, 0..=100
    pub lactose_level: f32,
    /// Protons above ATP synthase, 0..=60
    pub proton_count: u32,
    /// Shared protein synthesis slider (polymerase speed / mRNA concentration), 0.5..=5
    pub rate_level: f32,
    /// Radiation particles in flight, 0..=10
    pub radiation_level: u32,
    pub radiation_type: RadiationType,
    pub enzyme_stage: EnzymeStage,
    pub protein_stage: ProteinStage,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            substrate_count: 15,
            inhibitor_count: 0,
            ion_count: 20,
            gate_open: false,
            lactose_level: 0.0,
            proton_count: 15,
            rate_level: 2.0,
            radiation_level: 0,
            radiation_type: RadiationType::Alpha,
            enzyme_stage: EnzymeStage::Substrate,
            protein_stage: ProteinStage::Transcription,
        }
    }
}

impl Controls {
    pub const SUBSTRATE_RANGE: (u32, u32) = (1, 50);
    pub const INHIBITOR_RANGE: (u32, u32) = (0, 20);
    pub const ION_RANGE: (u32, u32) = (1, 50);
    pub const LACTOSE_RANGE: (f32, f32) = (0.0, 100.0);
    pub const PROTON_RANGE: (u32, u32) = (0, 60);
    pub const RATE_RANGE: (f32, f32) = (0.5, 5.0);
    pub const RADIATION_RANGE: (u32, u32) = (0, 10);

    /// Copy with every numeric input clamped to its range (NaN falls to the minimum)
    pub fn sanitized(&self) -> Self {
        let clamp_f = |v: f32, (lo, hi): (f32, f32)| if v.is_nan() { lo } else { v.clamp(lo, hi) };
        let clamp_u = |v: u32, (lo, hi): (u32, u32)| v.clamp(lo, hi);
        Self {
            substrate_count: clamp_u(self.substrate_count, Self::SUBSTRATE_RANGE),
            inhibitor_count: clamp_u(self.inhibitor_count, Self::INHIBITOR_RANGE),
            ion_count: clamp_u(self.ion_count, Self::ION_RANGE),
            gate_open: self.gate_open,
            lactose_level: clamp_f(self.lactose_level, Self::LACTOSE_RANGE),
            proton_count: clamp_u(self.proton_count, Self::PROTON_RANGE),
            rate_level: clamp_f(self.rate_level, Self::RATE_RANGE),
            radiation_level: clamp_u(self.radiation_level, Self::RADIATION_RANGE),
            radiation_type: self.radiation_type,
            enzyme_stage: self.enzyme_stage,
            protein_stage: self.protein_stage,
        }
    }
}

/// Headless run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for every random draw in the run
    pub seed: u64,
    pub simulation: SimulationKind,
    /// Simulated run length in seconds
    pub seconds: f32,
    /// Seconds of simulated time between printed readouts
    pub report_every: f32,
    pub controls: Controls,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 12345,
            simulation: SimulationKind::Enzyme,
            seconds: 10.0,
            report_every: 1.0,
            controls: Controls::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> LabResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> LabResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> LabResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply `--seed`, `--seconds`, `--config` and a positional simulation name
    pub fn apply_args<I, S>(mut self, args: I) -> LabResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = args.into_iter();
        let mut overrides: Vec<(String, String)> = Vec::new();
        let mut simulation = None;

        while let Some(arg) = args.next() {
            let arg = arg.as_ref();
            match arg {
                "--seed" | "--seconds" | "--config" | "--report-every" => {
                    let value = args
                        .next()
                        .ok_or_else(|| LabError::InvalidArgument(format!("{arg} needs a value")))?;
                    overrides.push((arg.to_string(), value.as_ref().to_string()));
                }
                name if !name.starts_with("--") => {
                    simulation = Some(
                        SimulationKind::from_str(name)
                            .ok_or_else(|| LabError::UnknownSimulation(name.to_string()))?,
                    );
                }
                other => return Err(LabError::InvalidArgument(other.to_string())),
            }
        }

        // A config file replaces the base; the remaining flags override it.
        if let Some((_, path)) = overrides.iter().find(|(flag, _)| flag == "--config") {
            self = Self::load(path)?;
        }
        for (flag, value) in &overrides {
            let bad = || LabError::InvalidArgument(format!("{flag} {value}"));
            match flag.as_str() {
                "--seed" => self.seed = value.parse().map_err(|_| bad())?,
                "--seconds" => self.seconds = parse_duration(value).ok_or_else(bad)?,
                "--report-every" => self.report_every = parse_duration(value).ok_or_else(bad)?,
                _ => {}
            }
        }
        if let Some(kind) = simulation {
            self.simulation = kind;
        }
        Ok(self)
    }
}

/// A finite, non-negative number of seconds
fn parse_duration(value: &str) -> Option<f32> {
    value
        .parse::<f32>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps_every_range() {
        let wild = Controls {
            substrate_count: 0,
            inhibitor_count: 99,
            ion_count: 500,
            lactose_level: f32::NAN,
            proton_count: 61,
            rate_level: 0.0,
            radiation_level: 11,
            ..Default::default()
        };
        let c = wild.sanitized();
        assert_eq!(c.substrate_count, 1);
        assert_eq!(c.inhibitor_count, 20);
        assert_eq!(c.ion_count, 50);
        assert_eq!(c.lactose_level, 0.0);
        assert_eq!(c.proton_count, 60);
        assert_eq!(c.rate_level, 0.5);
        assert_eq!(c.radiation_level, 10);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let settings =
            Settings::from_json(r#"{"simulation":"mutation","controls":{"radiation_level":4}}"#)
                .unwrap();
        assert_eq!(settings.simulation, SimulationKind::Mutation);
        assert_eq!(settings.controls.radiation_level, 4);
        assert_eq!(settings.controls.ion_count, 20);
        assert_eq!(settings.seed, Settings::default().seed);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(LabError::Parse(_))
        ));
    }

    #[test]
    fn test_apply_args() {
        let s = Settings::default()
            .apply_args(["atp", "--seed", "7", "--seconds", "2.5"])
            .unwrap();
        assert_eq!(s.simulation, SimulationKind::AtpSynthase);
        assert_eq!(s.seed, 7);
        assert_eq!(s.seconds, 2.5);

        assert!(matches!(
            Settings::default().apply_args(["photosynthesis"]),
            Err(LabError::UnknownSimulation(_))
        ));
        assert!(matches!(
            Settings::default().apply_args(["--seed"]),
            Err(LabError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_durations_must_be_finite() {
        for bad in ["inf", "-inf", "NaN", "-1", "soon"] {
            assert!(matches!(
                Settings::default().apply_args(["--seconds", bad]),
                Err(LabError::InvalidArgument(_))
            ));
            assert!(matches!(
                Settings::default().apply_args(["--report-every", bad]),
                Err(LabError::InvalidArgument(_))
            ));
        }
        let s = Settings::default()
            .apply_args(["--seconds", "0", "--report-every", "0.5"])
            .unwrap();
        assert_eq!(s.seconds, 0.0);
        assert_eq!(s.report_every, 0.5);
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in SimulationKind::ALL {
            assert_eq!(SimulationKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(RadiationType::from_str("GAMMA"), Some(RadiationType::Gamma));
    }

    #[test]
    fn test_stage_order() {
        assert!(EnzymeStage::Substrate < EnzymeStage::Inhibition);
        assert!(ProteinStage::Transcription < ProteinStage::Translation);
    }
}
