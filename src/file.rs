use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use ndarray::Array1;

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::scale::{ScaleBounds, ScaleDirection};

pub fn load_dataset(path: impl AsRef<Path>, name: &str) -> Result<Dataset> {
    let file = File::open(path)?;
    read_dataset(file, name)
}

/// Read a comma separated dataset:
///
/// ```text
/// members, inputs, outputs
/// max_1, ..., max_n          (n = inputs + outputs)
/// min_1, ..., min_n
/// x_1, ..., x_inputs, t_1, ..., t_outputs    (one line per member)
/// ```
///
/// Values are scaled into the network range with their column bounds as they
/// are read.
pub fn read_dataset<R: Read>(reader: R, name: &str) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut rows = reader.records();
    let mut next_row = |what: &str| -> Result<Vec<f64>> {
        match rows.next() {
            Some(row) => parse_row(&row?),
            None => Err(Error::Format(format!("missing {what} line"))),
        }
    };

    let header = next_row("header")?;
    let &[members, inputs, outputs] = header.as_slice() else {
        return Err(Error::Format(format!(
            "header needs 3 fields (members, inputs, outputs), got {}",
            header.len()
        )));
    };
    let members = to_count(members, "member count")?;
    let num_inputs = to_count(inputs, "input count")?;
    let num_outputs = to_count(outputs, "output count")?;
    let width = num_inputs + num_outputs;

    let max = next_row("maximum")?;
    let min = next_row("minimum")?;
    for (what, bound) in [("maximum", &max), ("minimum", &min)] {
        if bound.len() != width {
            return Err(Error::Format(format!(
                "{what} line has {} fields, expected {width}",
                bound.len()
            )));
        }
    }
    let bounds = ScaleBounds::new(Array1::from(min), Array1::from(max), num_inputs)?;

    let mut dataset = Dataset::new(name, num_inputs, num_outputs)?;
    for member in 0..members {
        let row = next_row(&format!("member {member}"))?;
        if row.len() != width {
            return Err(Error::Format(format!(
                "member {member} has {} fields, expected {width}",
                row.len()
            )));
        }
        let inputs = (0..num_inputs)
            .map(|i| bounds.input(i, row[i], ScaleDirection::ToNetwork))
            .collect::<Array1<f64>>();
        let targets = (0..num_outputs)
            .map(|k| bounds.output(k, row[num_inputs + k], ScaleDirection::ToNetwork))
            .collect::<Array1<f64>>();
        dataset.push(inputs, targets)?;
    }

    log::debug!(
        "loaded dataset `{name}`: {members} members, {num_inputs} inputs, {num_outputs} outputs"
    );
    dataset.with_bounds(bounds)
}

/// Write `weights` as one comma separated line.
pub fn write_weights<W: Write>(writer: &mut W, weights: &[f64]) -> Result<()> {
    let line = weights
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    writeln!(writer, "{line}")?;
    Ok(())
}

/// Read a flat weight vector: numbers separated by commas and/or line breaks.
pub fn read_weights<R: Read>(reader: R) -> Result<Vec<f64>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut weights = Vec::new();
    for row in reader.records() {
        weights.extend(parse_row(&row?)?);
    }
    Ok(weights)
}

pub fn load_weights(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    read_weights(File::open(path)?)
}

pub fn save_weights(path: impl AsRef<Path>, weights: &[f64]) -> Result<()> {
    let mut file = File::create(path)?;
    write_weights(&mut file, weights)
}

fn parse_row(row: &StringRecord) -> Result<Vec<f64>> {
    row.iter()
        .filter(|field| !field.is_empty())
        .map(|field| field.parse::<f64>().map_err(Error::from))
        .collect()
}

fn to_count(value: f64, what: &str) -> Result<usize> {
    if value.fract() != 0.0 || value < 0.0 {
        return Err(Error::Format(format!("{what} must be a whole number, got {value}")));
    }
    Ok(value as usize)
}

#[cfg(test)]
mod tests {
    use crate::assert_rel_eq_arr1;

    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    const SAMPLE: &str = "\
3, 2, 1
10.0, 1.0, 100.0
0.0, 1.0, 50.0
0.0, 1.0, 50.0
5.0, 1.0, 75.0
10.0, 1.0, 100.0
";

    #[test]
    fn read_and_scale_dataset() {
        let data = read_dataset(SAMPLE.as_bytes(), "sample").unwrap();
        assert_eq!("sample", data.name());
        assert_eq!(3, data.len());
        assert_eq!(2, data.num_inputs());
        assert_eq!(1, data.num_outputs());

        let records = data.records();
        assert_rel_eq_arr1!(records[0].inputs(), arr1(&[0.1, 1.0]));
        assert_rel_eq_arr1!(records[1].inputs(), arr1(&[0.5, 1.0]));
        assert_rel_eq_arr1!(records[2].targets(), arr1(&[0.9]));

        let bounds = data.bounds().unwrap();
        assert_eq!((50.0, 100.0), bounds.output_bounds(0));
        assert_relative_eq!(
            75.0,
            bounds.output(0, records[1].targets()[0], ScaleDirection::ToHuman)
        );
    }

    #[test]
    fn reject_malformed_datasets() {
        assert!(read_dataset("3, 2\n".as_bytes(), "bad").is_err());
        assert!(read_dataset("1, 1, 1\n1.0\n0.0, 0.0\n0.5, 0.5\n".as_bytes(), "bad").is_err());
        assert!(read_dataset("2, 1, 1\n1, 1\n0, 0\n0.5, 0.5\n".as_bytes(), "bad").is_err());
        assert!(read_dataset("1, 1, 1\n1, 1\n0, 0\n0.5, abc\n".as_bytes(), "bad").is_err());
        assert!(read_dataset("1, 0, 1\n1\n0\n0.5\n".as_bytes(), "bad").is_err());
    }

    #[test]
    fn weights_text_round_trip() {
        let weights = vec![0.25, -1.0, 0.125, 3.5];
        let mut buffer = Vec::new();
        write_weights(&mut buffer, &weights).unwrap();
        assert_eq!("0.25, -1, 0.125, 3.5\n", String::from_utf8(buffer.clone()).unwrap());
        assert_eq!(weights, read_weights(buffer.as_slice()).unwrap());
    }

    #[test]
    fn read_weights_across_lines() {
        let weights = read_weights("0.5, 1.5\n-2\n\n3, 4\n".as_bytes()).unwrap();
        assert_eq!(vec![0.5, 1.5, -2.0, 3.0, 4.0], weights);
    }
}
