// Copyright (c) 2024 Mike Tsao

use crate::{elements::Waveform, prelude::*};
use anyhow::anyhow;
use crossbeam::channel::{unbounded, Receiver, Sender};
use log::warn;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Names the generator's parameters. The string forms are the stable
/// identifiers that UIs and automation use.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum ParameterId {
    /// Peak level of the envelope, as a percentage.
    #[strum(to_string = "volume")]
    #[serde(rename = "volume")]
    Volume,
    /// Index of the oscillator [Waveform].
    #[strum(to_string = "type")]
    #[serde(rename = "type")]
    Type,
    /// Attack time, in milliseconds.
    #[strum(to_string = "attack")]
    #[serde(rename = "attack")]
    Attack,
    /// Decay time, in milliseconds.
    #[strum(to_string = "decay")]
    #[serde(rename = "decay")]
    Decay,
    /// Release time, in milliseconds.
    #[strum(to_string = "release")]
    #[serde(rename = "release")]
    Release,
    /// The level that decay settles on, as a percentage of the peak.
    #[strum(to_string = "decayVolume")]
    #[serde(rename = "decayVolume")]
    DecayVolume,
    /// Whether notes hold after decay (on) or release as soon as decay ends
    /// (off).
    #[strum(to_string = "sustain")]
    #[serde(rename = "sustain")]
    Sustain,
    /// Fine pitch offset, in cents.
    #[strum(to_string = "finetune")]
    #[serde(rename = "finetune")]
    Finetune,
    /// Coarse pitch offset, in semitones.
    #[strum(to_string = "notedetune")]
    #[serde(rename = "notedetune")]
    NoteDetune,
    /// Portamento time, as a percentage of attack + decay.
    #[strum(to_string = "glide")]
    #[serde(rename = "glide")]
    Glide,
}

/// Describes which values a [Parameter] accepts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterKind {
    /// A number within `min..=max`.
    Range {
        #[allow(missing_docs)]
        min: ParameterType,
        #[allow(missing_docs)]
        max: ParameterType,
    },
    /// An index into a list of named options.
    Select {
        #[allow(missing_docs)]
        options: Vec<String>,
    },
}

/// A single named, typed value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Parameter {
    id: ParameterId,
    title: String,
    kind: ParameterKind,
    value: ParameterType,
}
impl Parameter {
    /// Creates a numeric parameter.
    pub fn new_range(
        id: ParameterId,
        title: &str,
        min: ParameterType,
        max: ParameterType,
        value: ParameterType,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            kind: ParameterKind::Range { min, max },
            value,
        }
    }

    /// Creates an enumerated parameter whose value is an option index.
    pub fn new_select(id: ParameterId, title: &str, options: &[&str], index: usize) -> Self {
        Self {
            id,
            title: title.to_string(),
            kind: ParameterKind::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            value: index as ParameterType,
        }
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> ParameterId {
        self.id
    }

    #[allow(missing_docs)]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[allow(missing_docs)]
    pub fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    #[allow(missing_docs)]
    pub fn value(&self) -> ParameterType {
        self.value
    }

    /// The value's position within its range, 0.0..=1.0. For a select, the
    /// option index's position within the options.
    pub fn percent(&self) -> ParameterType {
        match &self.kind {
            ParameterKind::Range { min, max } => {
                if max > min {
                    (self.value - min) / (max - min)
                } else {
                    0.0
                }
            }
            ParameterKind::Select { options } => {
                if options.len() > 1 {
                    self.value / (options.len() - 1) as ParameterType
                } else {
                    0.0
                }
            }
        }
    }

    /// The value as an option index.
    pub fn index(&self) -> usize {
        self.value.max(0.0) as usize
    }

    /// The name of the selected option, if this is a select.
    pub fn option(&self) -> Option<&str> {
        match &self.kind {
            ParameterKind::Range { .. } => None,
            ParameterKind::Select { options } => options.get(self.index()).map(|o| o.as_str()),
        }
    }

    /// Whether the value is nonzero. Handy for off/on selects.
    pub fn is_on(&self) -> bool {
        self.value != 0.0
    }

    /// Checks whether `value` is acceptable to this parameter.
    pub fn validate(&self, value: ParameterType) -> anyhow::Result<()> {
        if !value.is_finite() {
            return Err(anyhow!("{} can't be set to {value}", self.id));
        }
        match &self.kind {
            ParameterKind::Range { min, max } => {
                if (*min..=*max).contains(&value) {
                    Ok(())
                } else {
                    Err(anyhow!(
                        "{value} is outside {}'s range {min}..={max}",
                        self.id
                    ))
                }
            }
            ParameterKind::Select { options } => {
                if value.fract() == 0.0 && value >= 0.0 && (value as usize) < options.len() {
                    Ok(())
                } else {
                    Err(anyhow!("{value} isn't a valid option index for {}", self.id))
                }
            }
        }
    }
}

/// Announces that a parameter now has a new value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterChange {
    /// Which parameter changed.
    pub id: ParameterId,
    /// Its new value.
    pub value: ParameterType,
}

/// The complete set of a generator's parameters, plus a change-notification
/// channel that anyone can subscribe to.
///
/// Every [ParameterId] is always present, so lookups can't fail.
#[derive(Debug)]
pub struct ParameterSet {
    parameters: Vec<Parameter>,
    subscribers: Vec<Sender<ParameterChange>>,
}
impl Default for ParameterSet {
    fn default() -> Self {
        let parameters = ParameterId::iter()
            .map(|id| match id {
                ParameterId::Volume => Parameter::new_range(id, "Volume", 0.0, 100.0, 50.0),
                ParameterId::Type => Parameter::new_select(id, "Type", &Waveform::NAMES, 0),
                ParameterId::Attack => Parameter::new_range(id, "Attack", 0.0, 1000.0, 10.0),
                ParameterId::Decay => Parameter::new_range(id, "Decay", 0.0, 1000.0, 200.0),
                ParameterId::Release => Parameter::new_range(id, "Release", 0.0, 4000.0, 200.0),
                ParameterId::DecayVolume => {
                    Parameter::new_range(id, "Decay Volume", 0.0, 100.0, 70.0)
                }
                ParameterId::Sustain => Parameter::new_select(id, "Sustain", &["off", "on"], 1),
                ParameterId::Finetune => {
                    Parameter::new_range(id, "Finetune", -100.0, 100.0, 0.0)
                }
                ParameterId::NoteDetune => {
                    Parameter::new_range(id, "Note Detune", -24.0, 24.0, 0.0)
                }
                ParameterId::Glide => Parameter::new_range(id, "Glide", 0.0, 100.0, 0.0),
            })
            .collect();
        Self {
            parameters,
            subscribers: Default::default(),
        }
    }
}
impl ParameterSet {
    /// Creates the default set, then applies `values` in order.
    pub fn new_with(values: &[(ParameterId, ParameterType)]) -> anyhow::Result<Self> {
        let mut r = Self::default();
        for (id, value) in values {
            r.set(*id, *value)?;
        }
        Ok(r)
    }

    #[allow(missing_docs)]
    pub fn get(&self, id: ParameterId) -> &Parameter {
        &self.parameters[id as usize]
    }

    /// Shortcut for the raw value of `id`.
    pub fn value(&self, id: ParameterId) -> ParameterType {
        self.get(id).value()
    }

    /// Shortcut for the percentage value of `id`.
    pub fn percent(&self, id: ParameterId) -> ParameterType {
        self.get(id).percent()
    }

    /// Iterates every parameter, in [ParameterId] order.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter()
    }

    /// Changes a value and notifies subscribers. Setting a parameter to the
    /// value it already has changes nothing and notifies no one, and so
    /// returns `None`.
    pub fn set(
        &mut self,
        id: ParameterId,
        value: ParameterType,
    ) -> anyhow::Result<Option<ParameterChange>> {
        let parameter = &mut self.parameters[id as usize];
        parameter.validate(value)?;
        if parameter.value == value {
            return Ok(None);
        }
        parameter.value = value;

        let change = ParameterChange { id, value };
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.send(change).is_ok());
        if self.subscribers.len() != before {
            warn!(
                "Dropped {} parameter subscriber(s) that stopped listening",
                before - self.subscribers.len()
            );
        }
        Ok(Some(change))
    }

    /// Like [ParameterSet::set()], but the parameter is named by its string
    /// identifier.
    pub fn set_by_name(
        &mut self,
        name: &str,
        value: ParameterType,
    ) -> anyhow::Result<Option<ParameterChange>> {
        let id: ParameterId = name
            .parse()
            .map_err(|_| anyhow!("{name} isn't a parameter"))?;
        self.set(id, value)
    }

    /// Returns a channel that receives every subsequent [ParameterChange].
    pub fn subscribe(&mut self) -> Receiver<ParameterChange> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }
}
