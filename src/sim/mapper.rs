//! Position-driven sequence building
//!
//! A polymerase slides along a template. Its coordinate maps to a template
//! index through a fixed linear transform; each time the index runs ahead of
//! the built strand, one paired base is appended. A pending radiation hit
//! swaps exactly one of those appends for a wrong base.

use serde::Serialize;

use super::rng::SimRng;

/// Nucleotide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Base {
    A,
    C,
    G,
    T,
    U,
}

impl Base {
    /// DNA alphabet used for templates
    pub const DNA: [Base; 4] = [Base::A, Base::T, Base::C, Base::G];
    /// RNA alphabet
    pub const RNA: [Base; 4] = [Base::A, Base::U, Base::C, Base::G];

    pub fn as_char(&self) -> char {
        match self {
            Base::A => 'A',
            Base::C => 'C',
            Base::G => 'G',
            Base::T => 'T',
            Base::U => 'U',
        }
    }
}

/// Pairing rule between template and built strand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pairing {
    /// DNA → DNA (A↔T, C↔G)
    Replication,
    /// DNA → RNA (A→U, T→A, C→G, G→C)
    Transcription,
}

impl Pairing {
    /// Symbols the built strand may contain
    pub fn alphabet(&self) -> &'static [Base; 4] {
        match self {
            Pairing::Replication => &Base::DNA,
            Pairing::Transcription => &Base::RNA,
        }
    }

    pub fn pair(&self, base: Base) -> Base {
        match (self, base) {
            (_, Base::C) => Base::G,
            (_, Base::G) => Base::C,
            (Pairing::Replication, Base::A) => Base::T,
            (Pairing::Transcription, Base::A) => Base::U,
            (_, Base::T) | (_, Base::U) => Base::A,
        }
    }
}

/// One appended base; `mutated` marks a radiation-induced substitution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuiltBase {
    pub base: Base,
    pub mutated: bool,
}

/// Template plus the strand being built against it
#[derive(Debug, Clone, Serialize)]
pub struct Strand {
    pub pairing: Pairing,
    template: Vec<Base>,
    built: Vec<BuiltBase>,
}

impl Strand {
    pub fn new(template: Vec<Base>, pairing: Pairing) -> Self {
        let built = Vec::with_capacity(template.len());
        Self {
            pairing,
            template,
            built,
        }
    }

    /// Random DNA template of `len` bases
    pub fn random(len: usize, pairing: Pairing, rng: &mut SimRng) -> Self {
        let template = (0..len)
            .map(|_| Base::DNA[rng.index(Base::DNA.len()).unwrap_or(0)])
            .collect();
        Self::new(template, pairing)
    }

    pub fn template(&self) -> &[Base] {
        &self.template
    }

    pub fn built(&self) -> &[BuiltBase] {
        &self.built
    }

    pub fn is_complete(&self) -> bool {
        self.built.len() == self.template.len()
    }

    /// Drop the built strand (cycle reset)
    pub fn reset(&mut self) {
        self.built.clear();
    }

    pub fn template_string(&self) -> String {
        self.template.iter().map(Base::as_char).collect()
    }

    /// Built strand with mutated bases in lower case
    pub fn built_string(&self) -> String {
        self.built
            .iter()
            .map(|b| {
                if b.mutated {
                    b.base.as_char().to_ascii_lowercase()
                } else {
                    b.base.as_char()
                }
            })
            .collect()
    }

    pub fn mutations(&self) -> usize {
        self.built.iter().filter(|b| b.mutated).count()
    }
}

/// Kinematic actor sliding along one axis, wrapping from `end` to `start`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Traveler {
    pub pos: f32,
    pub start: f32,
    pub end: f32,
    /// Units per second; zero or negative means parked
    pub speed: f32,
    /// Sub-range the actor cannot pass while blocked
    pub blocked_range: Option<(f32, f32)>,
}

impl Traveler {
    pub fn new(start: f32, end: f32, speed: f32) -> Self {
        Self {
            pos: start,
            start,
            end,
            speed,
            blocked_range: None,
        }
    }

    pub fn with_blocked_range(mut self, lo: f32, hi: f32) -> Self {
        self.blocked_range = Some((lo.min(hi), lo.max(hi)));
        self
    }

    /// Advance one tick. Returns true when the actor wrapped to the start.
    pub fn step(&mut self, dt: f32, blocked: bool, rng: &mut SimRng) -> bool {
        if !(self.speed > 0.0) {
            return false;
        }
        let next = self.pos + self.speed * dt;

        if let (true, Some((lo, hi))) = (blocked, self.blocked_range) {
            // Entering, inside, or about to jump over the blocked stretch: hold
            if self.pos < hi && next > lo {
                let center = (lo + hi) * 0.5;
                self.pos = (center + rng.centered(0.1)).clamp(lo, hi);
                return false;
            }
        }

        self.pos = next;
        if self.pos > self.end {
            self.pos = self.start;
            return true;
        }
        false
    }
}

/// What one mapper tick produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapperEvent {
    Appended { index: usize, base: BuiltBase },
    /// The actor finished a pass; `length` is the strand length before reset
    CycleComplete { length: usize },
}

/// Linear coordinate → index transform plus the actor it reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionToIndexMapper {
    /// Coordinate of index 0's leading edge
    pub origin: f32,
    /// Coordinate span of one index
    pub step: f32,
    pub traveler: Traveler,
}

impl PositionToIndexMapper {
    pub fn new(origin: f32, step: f32, traveler: Traveler) -> Self {
        Self {
            origin,
            step,
            traveler,
        }
    }

    /// `floor((position - origin) / step)`, or `None` when negative/undefined
    pub fn index_of(&self, position: f32) -> Option<usize> {
        if !(self.step > 0.0) {
            return None;
        }
        let raw = ((position - self.origin) / self.step).floor();
        if raw.is_finite() && raw >= 0.0 {
            Some(raw as usize)
        } else {
            None
        }
    }

    /// Append at most one base for the actor at `position`.
    ///
    /// The append happens only when the index is inside the template and the
    /// built strand has not yet reached it. A pending error is consumed by
    /// that append and never applied twice.
    pub fn advance(
        &self,
        position: f32,
        strand: &mut Strand,
        error_pending: &mut bool,
        rng: &mut SimRng,
    ) -> Option<MapperEvent> {
        let index = self.index_of(position)?;
        let template = strand.template.get(index).copied()?;
        if strand.built.len() > index {
            return None;
        }

        let correct = strand.pairing.pair(template);
        let base = if *error_pending {
            *error_pending = false;
            let wrong: Vec<Base> = strand
                .pairing
                .alphabet()
                .iter()
                .copied()
                .filter(|b| *b != correct)
                .collect();
            let pick = rng.index(wrong.len()).unwrap_or(0);
            BuiltBase {
                base: wrong[pick],
                mutated: true,
            }
        } else {
            BuiltBase {
                base: correct,
                mutated: false,
            }
        };
        strand.built.push(base);
        Some(MapperEvent::Appended { index, base })
    }

    /// Move the actor one tick, then advance. A wrap resets the strand and
    /// reports `CycleComplete` before any append at the new position.
    pub fn tick(
        &mut self,
        dt: f32,
        blocked: bool,
        strand: &mut Strand,
        error_pending: &mut bool,
        rng: &mut SimRng,
    ) -> Vec<MapperEvent> {
        let mut events = Vec::new();
        if self.traveler.step(dt, blocked, rng) {
            events.push(MapperEvent::CycleComplete {
                length: strand.built.len(),
            });
            strand.reset();
        }
        events.extend(self.advance(self.traveler.pos, strand, error_pending, rng));
        events
    }
}
