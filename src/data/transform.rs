use std::f64::consts::PI;

use super::geometry::GeometryConstants;
use super::model::{Column, DerivedRecord, DerivedTable, MeasurementTable, NumericSingularity, RawRecord};

/// Ω·m → Ω·cm for specific impedance.
const OHM_M_TO_OHM_CM: f64 = 100.0;
/// S/m → S/cm for specific conductivity.
const S_PER_M_TO_S_PER_CM: f64 = 0.01;

/// Derive every electrophysical quantity for one table.
///
/// Row-wise map: one output row per input row, same order, no cross-row
/// state. Values that come out infinite or NaN are stored as NaN and
/// reported in [`DerivedTable::singularities`]; the row is kept.
pub fn transform(table: &MeasurementTable, geometry: &GeometryConstants) -> DerivedTable {
    let mut singularities = Vec::new();
    let records = table
        .records
        .iter()
        .enumerate()
        .map(|(row_index, raw)| {
            let mut record = derive(raw, geometry);
            flag_singularities(&mut record, row_index, &mut singularities);
            record
        })
        .collect();

    DerivedTable {
        file_id: table.file_id.clone(),
        records,
        singularities,
    }
}

/// The formula chain for a single measurement point.
///
/// Each intermediate is turned into NaN as soon as it is non-finite, so every
/// quantity computed from it is NaN too.
pub fn derive(raw: &RawRecord, g: &GeometryConstants) -> DerivedRecord {
    let f = raw.frequency_hz;
    let c0 = g.vacuum_capacitance_f;

    let phi_rad = -raw.neg_phase_deg * PI / 180.0;
    let z_real = finite_or_nan(raw.magnitude_ohm * phi_rad.cos());
    let z_imag = finite_or_nan(raw.magnitude_ohm * phi_rad.sin());
    let geometry_factor = OHM_M_TO_OHM_CM * g.area_m2 / g.thickness_m;
    let z_real_spec = finite_or_nan(z_real * geometry_factor);
    let z_imag_spec = finite_or_nan(z_imag * geometry_factor);

    let log_frequency = finite_or_nan(f.log10());
    let angular_frequency = finite_or_nan(2.0 * PI * f);
    let z_sq = finite_or_nan(z_real.powi(2) + z_imag.powi(2));
    let capacitance = finite_or_nan(z_imag / (angular_frequency * z_sq));
    let phase_deg = finite_or_nan(-raw.neg_phase_deg);

    let conductance = finite_or_nan(z_real / z_sq);
    let conductivity_spec =
        finite_or_nan(conductance * g.thickness_m * S_PER_M_TO_S_PER_CM / g.area_m2);
    let log_conductivity_spec = finite_or_nan(conductivity_spec.log10());

    let permittivity_real = finite_or_nan(capacitance / c0);
    let permittivity_imag = finite_or_nan(conductance / (angular_frequency * c0));

    DerivedRecord {
        raw: *raw,
        z_real,
        z_imag,
        z_real_spec,
        z_imag_spec,
        log_frequency,
        angular_frequency,
        capacitance,
        phase_deg,
        conductance,
        conductivity_spec,
        log_conductivity_spec,
        permittivity_real,
        permittivity_imag,
        beta_real: finite_or_nan(1.0 / permittivity_real),
        beta_imag: finite_or_nan(1.0 / permittivity_imag),
        loss_tangent: finite_or_nan(permittivity_imag / permittivity_real),
        modulus_real: finite_or_nan(angular_frequency * c0 * z_imag),
        modulus_imag: finite_or_nan(angular_frequency * c0 * z_real),
    }
}

fn finite_or_nan(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}

fn flag_singularities(
    record: &mut DerivedRecord,
    row_index: usize,
    out: &mut Vec<NumericSingularity>,
) {
    let fields: [(Column, &mut f64); 17] = [
        (Column::ZRealSpec, &mut record.z_real_spec),
        (Column::ZImagSpec, &mut record.z_imag_spec),
        (Column::LogFrequency, &mut record.log_frequency),
        (Column::AngularFrequency, &mut record.angular_frequency),
        (Column::Capacitance, &mut record.capacitance),
        (Column::Phase, &mut record.phase_deg),
        (Column::Conductance, &mut record.conductance),
        (Column::ConductivitySpec, &mut record.conductivity_spec),
        (Column::LogConductivitySpec, &mut record.log_conductivity_spec),
        (Column::PermittivityReal, &mut record.permittivity_real),
        (Column::PermittivityImag, &mut record.permittivity_imag),
        (Column::BetaReal, &mut record.beta_real),
        (Column::BetaImag, &mut record.beta_imag),
        (Column::LossTangent, &mut record.loss_tangent),
        (Column::ModulusReal, &mut record.modulus_real),
        (Column::ModulusImag, &mut record.modulus_imag),
        (Column::Frequency, &mut record.raw.frequency_hz),
    ];
    for (field, value) in fields {
        if !value.is_finite() {
            *value = f64::NAN;
            out.push(NumericSingularity { field, row_index });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_geometry() -> GeometryConstants {
        GeometryConstants::compute(1.0, 10.0).unwrap()
    }

    fn close(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * a.abs().max(b.abs())
    }

    #[test]
    fn reference_point() {
        let g = reference_geometry();
        let r = derive(&RawRecord::new(1000.0, 500.0, 30.0), &g);

        assert!(close(r.z_real, 433.0127, 1e-6));
        assert!(close(r.z_imag, -250.0, 1e-9));
        let factor = 100.0 * g.area_m2 / g.thickness_m;
        assert!(close(r.z_real_spec, 433.0127 * factor, 1e-6));
        assert!(close(r.z_imag_spec, -250.0 * factor, 1e-9));
        assert!(close(r.log_frequency, 3.0, 1e-12));
        assert!(close(r.angular_frequency, 6283.185307, 1e-9));
        assert_eq!(r.phase_deg, -30.0);
        // Cu = Z'' / (ω·|Z|²) with |Z|² = 250000
        assert!(close(r.capacitance, -250.0 / (r.angular_frequency * 250_000.0), 1e-9));
        assert!(close(r.conductance, 433.0127 / 250_000.0, 1e-6));
    }

    #[test]
    fn identities_hold_across_a_sweep() {
        let g = GeometryConstants::compute(1.1, 12.5).unwrap();
        let table = MeasurementTable::new(
            "sweep.txt",
            (0..40)
                .map(|i| {
                    let f = 10f64.powf(1.0 + i as f64 * 0.15);
                    RawRecord::new(f, 1e6 / (1.0 + i as f64), 5.0 + 2.0 * i as f64)
                })
                .collect(),
        );
        let derived = transform(&table, &g);
        assert!(derived.singularities.is_empty());

        for (raw, d) in table.records.iter().zip(&derived.records) {
            let modulus_sq = d.z_real.powi(2) + d.z_imag.powi(2);
            assert!(close(modulus_sq, raw.magnitude_ohm.powi(2), 1e-12));
            assert_eq!(d.phase_deg, -raw.neg_phase_deg);
            assert_eq!(d.loss_tangent, d.permittivity_imag / d.permittivity_real);
            assert_eq!(d.beta_real, 1.0 / d.permittivity_real);
            assert_eq!(d.beta_imag, 1.0 / d.permittivity_imag);
        }
    }

    #[test]
    fn preserves_row_order_and_count() {
        let g = reference_geometry();
        let freqs = [5000.0, 20.0, 1e6, 300.0];
        let table = MeasurementTable::new(
            "unsorted.txt",
            freqs.iter().map(|&f| RawRecord::new(f, 100.0, 10.0)).collect(),
        );
        let derived = transform(&table, &g);
        assert_eq!(derived.file_id, "unsorted.txt");
        let out: Vec<f64> = derived.records.iter().map(|r| r.raw.frequency_hz).collect();
        assert_eq!(out, freqs);
    }

    #[test]
    fn zero_frequency_is_flagged_not_fatal() {
        let g = reference_geometry();
        let table = MeasurementTable::new(
            "zero.txt",
            vec![RawRecord::new(1000.0, 500.0, 30.0), RawRecord::new(0.0, 500.0, 30.0)],
        );
        let derived = transform(&table, &g);
        assert_eq!(derived.len(), 2);

        let flagged: Vec<Column> = derived
            .singularities
            .iter()
            .filter(|s| s.row_index == 1)
            .map(|s| s.field)
            .collect();
        assert!(flagged.contains(&Column::LogFrequency));
        assert!(flagged.contains(&Column::Capacitance));
        assert!(flagged.contains(&Column::PermittivityImag));
        assert!(flagged.contains(&Column::BetaReal));
        assert!(flagged.contains(&Column::BetaImag));
        assert!(derived.records[1].log_frequency.is_nan());
        assert!(derived.records[1].beta_real.is_nan());
        assert!(derived.records[1].beta_imag.is_nan());
        assert!(derived.singularities.iter().all(|s| s.row_index == 1));
        // Quantities that do not depend on ω stay valid.
        assert!(derived.records[1].conductance.is_finite());
    }

    #[test]
    fn zero_impedance_is_flagged_not_fatal() {
        let g = reference_geometry();
        let table = MeasurementTable::new("short.txt", vec![RawRecord::new(1000.0, 0.0, 30.0)]);
        let derived = transform(&table, &g);
        let fields: Vec<Column> = derived.singularities.iter().map(|s| s.field).collect();

        assert!(fields.contains(&Column::Capacitance));
        assert!(fields.contains(&Column::Conductance));
        assert!(fields.contains(&Column::LossTangent));
        assert!(derived.records[0].capacitance.is_nan());
        assert_eq!(derived.records[0].z_real_spec, 0.0);
        assert_eq!(derived.records[0].modulus_real, 0.0);
    }
}
