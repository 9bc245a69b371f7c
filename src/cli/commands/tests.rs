//! CLI command tests

use super::figure::{usage, CurveInputs, FigureAction};
use super::*;
use crate::cli::LogLevel;
use crate::config::*;
use crate::eval::EvalDataset;
use crate::io::save_network;
use crate::model::fixtures;
use crate::prune::PruningStrategy;
use crate::sweep::AccuracyCurve;
use ndarray::Array3;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write conv_fc, a self-labelled dataset and a config into `dir`.
fn create_test_config(dir: &TempDir) -> PathBuf {
    let model_path = dir.path().join("model.json");
    let data_path = dir.path().join("data.json");
    let output_path = dir.path().join("figures");
    let config_path = dir.path().join("sweep.yaml");

    let net = fixtures::conv_fc();
    save_network(&net, &model_path).unwrap();
    let pairs: Vec<_> = (0..4)
        .map(|i| {
            let x = Array3::from_shape_fn((1, 3, 3), |(_, h, w)| (i + h + 2 * w) as f32 - 3.0);
            let label = net.predict(&x).unwrap();
            (x, label)
        })
        .collect();
    EvalDataset::from_pairs(pairs).save(&data_path).unwrap();

    let config = format!(
        "model: {}\ndataset: {}\ngrid: {{ ratios: [0.0, 0.5] }}\noutput_dir: {}\nhistogram_bins: 5\n",
        model_path.display(),
        data_path.display(),
        output_path.display()
    );
    std::fs::write(&config_path, config).unwrap();
    config_path
}

fn figure(action: &str, config: Option<PathBuf>) -> Result<(), String> {
    run_command(Cli {
        command: Command::Figure(FigureArgs {
            action: Some(action.to_string()),
            config,
        }),
        verbose: false,
        quiet: true,
    })
}

#[test]
fn test_figure_unknown_action_is_ok() {
    // TEST_ID: CMD-001
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    assert!(figure("figure_9.9", Some(config)).is_ok());
    assert!(!dir.path().join("figures").exists());

    let result = run_command(Cli {
        command: Command::Figure(FigureArgs {
            action: None,
            config: None,
        }),
        verbose: false,
        quiet: true,
    });
    assert!(result.is_ok());
}

#[test]
fn test_figure_usage_lists_actions() {
    // TEST_ID: CMD-002
    let text = usage();
    for action in FigureAction::ALL {
        assert!(text.contains(action.id()));
        assert_eq!(FigureAction::parse(action.id()), Some(action));
    }
    assert_eq!(FigureAction::parse("figure_5"), None);
}

#[test]
fn test_figure_requires_config() {
    // TEST_ID: CMD-003
    assert!(figure("figure_5.8", None).is_err());
}

#[test]
fn test_figure_weight_distributions() {
    // TEST_ID: CMD-004
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    figure("figure_5.5", Some(config)).unwrap();
    assert!(dir.path().join("figures/figure_5.5_linear.json").exists());
    assert!(dir.path().join("figures/figure_5.5_convolutional.json").exists());
}

#[test]
fn test_figure_filter_distribution() {
    // TEST_ID: CMD-005
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    figure("figure_5.6", Some(config)).unwrap();
    assert!(dir.path().join("figures/figure_5.6.json").exists());
}

#[test]
fn test_figure_unstructured_curves() {
    // TEST_ID: CMD-006
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    figure("figure_5.7", Some(config)).unwrap();

    let global = AccuracyCurve::load_json(dir.path().join("figures/figure_5.7_global.json")).unwrap();
    let local = AccuracyCurve::load_json(dir.path().join("figures/figure_5.7_local.json")).unwrap();
    assert_eq!(global.strategy, PruningStrategy::GlobalUnstructured);
    assert_eq!(local.strategy, PruningStrategy::LocalUnstructured);
    assert_eq!(global.percentages, vec![0.0f32, 50.0]);
    assert_eq!(global.accuracies[0], 1.0);
}

#[test]
fn test_curve_inputs_load_once_for_all_strategies() {
    // TEST_ID: CMD-015
    let dir = TempDir::new().unwrap();
    let config = load_config(&create_test_config(&dir)).unwrap();
    let model = load_model(&config).unwrap();
    let inputs = CurveInputs::load(&config, model).unwrap();

    std::fs::remove_file(&config.model).unwrap();
    std::fs::remove_file(&config.dataset).unwrap();

    let mut controller = crate::sweep::SweepController::new();
    for strategy in PruningStrategy::ALL {
        let curve = inputs
            .sweep(&mut controller, strategy)
            .unwrap_or_else(|e| panic!("CMD-015 FALSIFIED: {strategy} reloaded inputs: {e}"));
        assert_eq!(curve.len(), inputs.grid.len());
        assert_eq!(curve.accuracies[0], 1.0);
    }
}

#[test]
fn test_figure_structured_curve() {
    // TEST_ID: CMD-007
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    figure("figure_5.8", Some(config)).unwrap();
    let curve = AccuracyCurve::load_json(dir.path().join("figures/figure_5.8.json")).unwrap();
    assert_eq!(curve.title, "Structured pruning");
    assert_eq!(curve.accuracies[0], 1.0);
}

#[test]
fn test_sweep_single_strategy() {
    // TEST_ID: CMD-008
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    let out = dir.path().join("curves");
    let result = run_command(Cli {
        command: Command::Sweep(SweepArgs {
            config,
            strategy: Some(PruningStrategy::Structured),
            output_dir: Some(out.clone()),
        }),
        verbose: false,
        quiet: true,
    });
    assert!(result.is_ok(), "CMD-008 FALSIFIED: {result:?}");
    assert!(out.join("structured_curve.json").exists());
    assert!(!out.join("global_curve.json").exists());
}

#[test]
fn test_sweep_all_configured_strategies() {
    // TEST_ID: CMD-009
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    sweep::run_sweep(
        SweepArgs {
            config,
            strategy: None,
            output_dir: None,
        },
        LogLevel::Quiet,
    )
    .unwrap();
    for name in ["global_curve.json", "local_curve.json", "structured_curve.json"] {
        assert!(dir.path().join("figures").join(name).exists(), "missing {name}");
    }
}

#[test]
fn test_validate_command() {
    // TEST_ID: CMD-010
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir);
    assert!(validate::run_validate(ValidateArgs { config: config.clone() }, LogLevel::Quiet).is_ok());

    std::fs::remove_file(dir.path().join("model.json")).unwrap();
    let err = validate::run_validate(ValidateArgs { config }, LogLevel::Quiet).unwrap_err();
    assert!(err.contains("Model file not found"));
}

#[test]
fn test_info_command() {
    // TEST_ID: CMD-011
    let dir = TempDir::new().unwrap();
    create_test_config(&dir);
    let model = dir.path().join("model.json");
    assert!(info::run_info(InfoArgs { model }, LogLevel::Quiet).is_ok());
    assert!(info::run_info(
        InfoArgs {
            model: dir.path().join("missing.json")
        },
        LogLevel::Quiet
    )
    .is_err());
}

#[test]
fn test_info_formatting() {
    // TEST_ID: CMD-012
    let net = fixtures::conv_fc();
    let table = info::format_layer_table(&net);
    assert!(table.contains("conv1"));
    assert!(table.contains("[2, 1, 2, 2]"));
    let units = info::format_prunable_units(&net);
    assert!(units.contains("Global unstructured: 24 units in 2 layers"));
    assert!(units.contains("Structured: 2 units in 1 layers"));
}

#[test]
fn test_curve_summary() {
    // TEST_ID: CMD-013
    let mut curve = AccuracyCurve::new("Structured pruning", PruningStrategy::Structured);
    assert_eq!(sweep::format_curve_summary(&curve), "Structured pruning: no points");
    curve.push(0.0, 1.0);
    curve.push(0.5, 0.75);
    assert_eq!(
        sweep::format_curve_summary(&curve),
        "Structured pruning: 2 points, accuracy 1.0000 -> 0.7500 (max drop 0.2500)"
    );
}

#[test]
fn test_log_level_from_flags() {
    // TEST_ID: CMD-014
    assert_eq!(LogLevel::from_flags(true, true), LogLevel::Quiet);
    assert_eq!(LogLevel::from_flags(false, true), LogLevel::Verbose);
    assert_eq!(LogLevel::from_flags(false, false), LogLevel::Normal);
    assert!(LogLevel::Verbose.permits(LogLevel::Normal));
    assert!(!LogLevel::Normal.permits(LogLevel::Verbose));
    assert!(!LogLevel::Quiet.permits(LogLevel::Normal));
}
