use std::io::Write;

use crate::data::{DataRecord, Dataset};
use crate::error::Result;
use crate::network::Network;
use crate::scale::{ScaleBounds, ScaleDirection};
use crate::train::TrainReport;

/// Columns printed next to each record's inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    #[default]
    Outputs,
    OutputsTargets,
    OutputsErrors,
    OutputsTargetsErrors,
}

impl ReportMode {
    fn label(self) -> &'static str {
        match self {
            ReportMode::Outputs => "(Outputs):",
            ReportMode::OutputsTargets => "(Outputs,Targets): ",
            ReportMode::OutputsErrors => "(Outputs,Errors):  ",
            ReportMode::OutputsTargetsErrors => "(Outputs,Targets,Errors):   ",
        }
    }

    fn column_width(self) -> usize {
        match self {
            ReportMode::Outputs => 10,
            ReportMode::OutputsTargets | ReportMode::OutputsErrors => 19,
            ReportMode::OutputsTargetsErrors => 28,
        }
    }
}

pub fn write_learn_parameters(sink: &mut dyn Write, net: &Network) -> Result<()> {
    let params = net.learn_parameters();
    writeln!(
        sink,
        "Max Epoch: {:6}, Learning Rate: {:06.3}, Momentum: {:06.3}",
        params.epoch_max, params.learning_rate, params.momentum
    )?;
    Ok(())
}

/// One block per layer, one `{bias, w1, ...}` line per unit.
pub fn write_weights(sink: &mut dyn Write, net: &Network) -> Result<()> {
    for (index, layer) in net.layers().iter().enumerate() {
        writeln!(sink, "Layer {index:2}:")?;
        for unit in layer.units() {
            let weights = unit
                .weights()
                .iter()
                .map(|w| format!("{w:7.5}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(sink, "{{{weights}}}")?;
        }
        writeln!(sink)?;
    }
    Ok(())
}

/// Inputs and the `mode` columns of every record, converted back to human units
/// when the dataset carries bounds.
pub fn write_results(sink: &mut dyn Write, data: &Dataset, mode: ReportMode) -> Result<()> {
    let input_width = (9 * data.num_inputs()).saturating_sub(2);
    let output_width = mode.column_width() * data.num_outputs();
    writeln!(
        sink,
        "{:<input_width$}|{:<output_width$}",
        "Inputs: ",
        mode.label()
    )?;

    for record in data.records() {
        write_record(sink, record, data.bounds(), mode)?;
    }
    Ok(())
}

fn write_record(
    sink: &mut dyn Write,
    record: &DataRecord,
    bounds: Option<&ScaleBounds>,
    mode: ReportMode,
) -> Result<()> {
    let input = |i: usize, v: f64| bounds.map_or(v, |b| b.input(i, v, ScaleDirection::ToHuman));
    let output = |k: usize, v: f64, direction| bounds.map_or(v, |b| b.output(k, v, direction));

    let inputs = record
        .inputs()
        .iter()
        .enumerate()
        .map(|(i, &v)| format!("{:7.4}", input(i, v)))
        .collect::<Vec<_>>()
        .join(", ");
    write!(sink, "{inputs}|")?;

    for k in 0..record.outputs().len() {
        let out = output(k, record.outputs()[k], ScaleDirection::ToHuman);
        let target = output(k, record.targets()[k], ScaleDirection::ToHuman);
        let error = output(k, record.errors()[k], ScaleDirection::ErrorToHuman);
        match mode {
            ReportMode::Outputs => write!(sink, "({out:7.4}) ")?,
            ReportMode::OutputsTargets => write!(sink, "({out:7.4}, {target:7.4}) ")?,
            ReportMode::OutputsErrors => write!(sink, "({out:7.4}, {error:7.4}) ")?,
            ReportMode::OutputsTargetsErrors => {
                write!(sink, "({out:7.4}, {target:7.4}, {error:7.4}) ")?
            }
        }
    }
    writeln!(sink)?;
    Ok(())
}

/// `Epochs: N, Training SSE: x[, Valid SSE: y]`
pub fn write_summary(sink: &mut dyn Write, report: &TrainReport) -> Result<()> {
    write!(
        sink,
        "Epochs: {:6}, Training SSE: {:9.5}",
        report.epochs, report.training_error
    )?;
    if let Some(validation) = report.validation_error {
        write!(sink, ", Valid SSE: {validation:9.5}")?;
    }
    writeln!(sink)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::activation::Activation;
    use crate::file::read_dataset;
    use crate::network::{LearnParameters, NetworkBuilder};
    use crate::train::StopReason;

    fn identity_network() -> Network {
        let mut net = NetworkBuilder::new(1)
            .layers(&[1])
            .activation(Activation::Identity)
            .learn_parameters(LearnParameters {
                epoch_max: 250,
                learning_rate: 0.25,
                momentum: 0.5,
            })
            .build_with_seed(0)
            .unwrap();
        net.set_weights(Some(&[0.5, -0.25])).unwrap();
        net
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn learn_parameters_line() {
        let net = identity_network();
        assert_eq!(
            "Max Epoch:    250, Learning Rate: 00.250, Momentum: 00.500\n",
            render(|sink| write_learn_parameters(sink, &net))
        );
    }

    #[test]
    fn weights_block() {
        let net = identity_network();
        assert_eq!(
            "Layer  0:\n{0.50000, -0.25000}\n\n",
            render(|sink| write_weights(sink, &net))
        );
    }

    #[test]
    fn results_in_human_units() {
        let mut data = read_dataset("1, 1, 1\n10, 100\n0, 0\n5, 50\n".as_bytes(), "r").unwrap();
        let mut net = identity_network();
        // Network input 0.5 -> output 0.5 - 0.125 = 0.375, target 0.5.
        net.run_once(&mut data);

        let text = render(|sink| write_results(sink, &data, ReportMode::OutputsTargetsErrors));
        let mut lines = text.lines();
        assert_eq!(
            "Inputs: |(Outputs,Targets,Errors):   ",
            lines.next().unwrap()
        );
        assert_eq!(
            " 5.0000|(34.3750, 50.0000, 15.6250) ",
            lines.next().unwrap()
        );
        assert_eq!(None, lines.next());
    }

    #[test]
    fn results_per_mode() {
        let cases = [
            (ReportMode::Outputs, "(Outputs):", " 5.0000|(34.3750) "),
            (
                ReportMode::OutputsTargets,
                "(Outputs,Targets): ",
                " 5.0000|(34.3750, 50.0000) ",
            ),
            (
                ReportMode::OutputsErrors,
                "(Outputs,Errors):  ",
                " 5.0000|(34.3750, 15.6250) ",
            ),
        ];
        for (mode, label, line) in cases {
            let mut data =
                read_dataset("1, 1, 1\n10, 100\n0, 0\n5, 50\n".as_bytes(), "r").unwrap();
            let mut net = identity_network();
            net.run_once(&mut data);

            let text = render(|sink| write_results(sink, &data, mode));
            let lines = text.lines().collect::<Vec<_>>();
            assert_eq!(vec![format!("Inputs: |{label}").as_str(), line], lines);
        }
    }

    #[test]
    fn results_without_bounds_are_unscaled() {
        let mut data = Dataset::from_rows("raw", &[vec![0.5]], &[vec![0.5]]).unwrap();
        let mut net = identity_network();
        net.run_once(&mut data);

        let text = render(|sink| write_results(sink, &data, ReportMode::OutputsTargetsErrors));
        let mut lines = text.lines();
        assert_eq!(
            "Inputs: |(Outputs,Targets,Errors):   ",
            lines.next().unwrap()
        );
        assert_eq!(
            " 0.5000|( 0.3750,  0.5000,  0.1250) ",
            lines.next().unwrap()
        );
        assert_eq!(None, lines.next());
    }

    #[test]
    fn summary_line() {
        let report = TrainReport {
            stop_reason: StopReason::MaxEpochsReached,
            epochs: 12,
            training_error: 0.5,
            validation_error: Some(0.25),
        };
        assert_eq!(
            "Epochs:     12, Training SSE:   0.50000, Valid SSE:   0.25000\n",
            render(|sink| write_summary(sink, &report))
        );
    }
}
