use std::fmt;

// ---------------------------------------------------------------------------
// RawRecord – one row of an instrument sweep
// ---------------------------------------------------------------------------

/// A single measurement point as written by the RLC meter.
/// The instrument stores the phase angle negated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    pub frequency_hz: f64,
    pub magnitude_ohm: f64,
    pub neg_phase_deg: f64,
}

impl RawRecord {
    pub fn new(frequency_hz: f64, magnitude_ohm: f64, neg_phase_deg: f64) -> Self {
        Self {
            frequency_hz,
            magnitude_ohm,
            neg_phase_deg,
        }
    }
}

// ---------------------------------------------------------------------------
// MeasurementTable – one input file, rows in file order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct MeasurementTable {
    /// Source file name (with extension). Unique within a batch.
    pub file_id: String,
    pub records: Vec<RawRecord>,
}

impl MeasurementTable {
    pub fn new(file_id: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            file_id: file_id.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// DerivedRecord – raw values plus every computed quantity
// ---------------------------------------------------------------------------

/// Units: impedances in Ω, specific impedances in Ω·cm, conductance in S,
/// specific conductivity in S/cm, angles in degrees, capacitance in F.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRecord {
    pub raw: RawRecord,
    pub z_real: f64,
    pub z_imag: f64,
    pub z_real_spec: f64,
    pub z_imag_spec: f64,
    pub log_frequency: f64,
    pub angular_frequency: f64,
    pub capacitance: f64,
    pub phase_deg: f64,
    pub conductance: f64,
    pub conductivity_spec: f64,
    pub log_conductivity_spec: f64,
    pub permittivity_real: f64,
    pub permittivity_imag: f64,
    /// Reciprocal permittivity. Kept for output compatibility only.
    pub beta_real: f64,
    pub beta_imag: f64,
    pub loss_tangent: f64,
    pub modulus_real: f64,
    pub modulus_imag: f64,
}

// ---------------------------------------------------------------------------
// Column – named view onto a DerivedRecord
// ---------------------------------------------------------------------------

/// Every value a sink can emit. Sinks pick an ordered subset (a projection)
/// and read the values through [`Column::value`]; nothing is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Frequency,
    ZRealSpec,
    ZImagSpec,
    /// `-Z''_spec`, the Zview sign convention.
    NegZImagSpec,
    LogFrequency,
    AngularFrequency,
    Capacitance,
    Phase,
    Conductance,
    ConductivitySpec,
    LogConductivitySpec,
    PermittivityReal,
    PermittivityImag,
    BetaReal,
    BetaImag,
    LossTangent,
    ModulusReal,
    ModulusImag,
}

impl Column {
    /// Header label as used by the downstream spreadsheets.
    pub fn label(self) -> &'static str {
        match self {
            Column::Frequency => "f",
            Column::ZRealSpec => "Z', Om·cm",
            Column::ZImagSpec => "Z\", Om·cm",
            Column::NegZImagSpec => "-Z\", Om·cm",
            Column::LogFrequency => "logf",
            Column::AngularFrequency => "ω",
            Column::Capacitance => "Cu",
            Column::Phase => "φ",
            Column::Conductance => "σu",
            Column::ConductivitySpec => "σspec, Sm/cm",
            Column::LogConductivitySpec => "logσspec",
            Column::PermittivityReal => "ε'",
            Column::PermittivityImag => "ε\"",
            Column::BetaReal => "β'",
            Column::BetaImag => "β\"",
            Column::LossTangent => "tanδ",
            Column::ModulusReal => "M'",
            Column::ModulusImag => "M\"",
        }
    }

    pub fn value(self, record: &DerivedRecord) -> f64 {
        match self {
            Column::Frequency => record.raw.frequency_hz,
            Column::ZRealSpec => record.z_real_spec,
            Column::ZImagSpec => record.z_imag_spec,
            // `+ 0.0` turns -0.0 into 0.0 so a zero never prints as "-0".
            Column::NegZImagSpec => -record.z_imag_spec + 0.0,
            Column::LogFrequency => record.log_frequency,
            Column::AngularFrequency => record.angular_frequency,
            Column::Capacitance => record.capacitance,
            Column::Phase => record.phase_deg,
            Column::Conductance => record.conductance,
            Column::ConductivitySpec => record.conductivity_spec,
            Column::LogConductivitySpec => record.log_conductivity_spec,
            Column::PermittivityReal => record.permittivity_real,
            Column::PermittivityImag => record.permittivity_imag,
            Column::BetaReal => record.beta_real,
            Column::BetaImag => record.beta_imag,
            Column::LossTangent => record.loss_tangent,
            Column::ModulusReal => record.modulus_real,
            Column::ModulusImag => record.modulus_imag,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Singularities and the derived table
// ---------------------------------------------------------------------------

/// A derived value that came out infinite or NaN. The value is stored as NaN
/// and the row is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericSingularity {
    pub field: Column,
    /// Zero-based position of the row within its table.
    pub row_index: usize,
}

impl fmt::Display for NumericSingularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at row {}", self.field, self.row_index)
    }
}

/// Output of one transform pass. Shared read-only by every sink.
#[derive(Debug, Clone)]
pub struct DerivedTable {
    pub file_id: String,
    pub records: Vec<DerivedRecord>,
    pub singularities: Vec<NumericSingularity>,
}

impl DerivedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
