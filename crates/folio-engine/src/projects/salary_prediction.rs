use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use folio_contracts::console::{format_thousands, ConsoleExt};
use folio_contracts::projects::RenderContext;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::charts::scatter_chart;
use crate::data::DataTable;
use crate::stats::LinearModel;

use super::{publish_chart, Project};

const NAMESPACE: &str = Project::SalaryPrediction.slug();
const DATA_FILE: &str = "salary_data.csv";
const MODEL_FILE: &str = "salary_model.json";
const FEATURES: [&str; 2] = ["Experience_Years", "Current_Salary"];
const TARGET: &str = "Future_Salary";

#[derive(Debug, Serialize, Deserialize)]
struct CachedModel {
    dataset_sha256: String,
    model: LinearModel,
}

pub fn dataset_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Returns the model cached at `model_path` when it was fitted on the dataset
/// with this `fingerprint`, otherwise fits a fresh one and caches it.
pub fn train_or_load_model(
    table: &DataTable,
    fingerprint: &str,
    model_path: &Path,
) -> Result<LinearModel> {
    if let Some(cached) = read_cached_model(model_path) {
        if cached.dataset_sha256 == fingerprint {
            return Ok(cached.model);
        }
    }

    let mut features = Vec::new();
    let mut targets = Vec::new();
    for row in 0..table.len() {
        let values: Option<Vec<f64>> = FEATURES
            .iter()
            .chain(std::iter::once(&TARGET))
            .map(|column| table.value(row, column).and_then(|cell| cell.as_number()))
            .collect();
        if let Some(mut values) = values {
            targets.push(values.pop().unwrap_or_default());
            features.push(values);
        }
    }
    let model = LinearModel::fit(&features, &targets).context("failed fitting salary model")?;

    let cached = CachedModel {
        dataset_sha256: fingerprint.to_string(),
        model,
    };
    if let Some(parent) = model_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(model_path, serde_json::to_string_pretty(&cached)?)
        .with_context(|| format!("failed writing {}", model_path.display()))?;
    Ok(cached.model)
}

fn read_cached_model(path: &Path) -> Option<CachedModel> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

pub(super) fn show(ctx: &mut RenderContext<'_>) -> Result<()> {
    ctx.console
        .title("Future Salary Prediction with Machine Learning")?;

    let data_path = ctx.settings.data_file(DATA_FILE);
    if !data_path.exists() {
        return ctx.console.error(
            "Dataset not found! Please add the 'salary_data.csv' file to the 'data' folder.",
        );
    }
    let bytes =
        fs::read(&data_path).with_context(|| format!("failed reading {}", data_path.display()))?;
    let table = match DataTable::from_csv_reader(bytes.as_slice()) {
        Ok(table) => table,
        Err(err) => {
            return ctx
                .console
                .error(&format!("Could not read '{DATA_FILE}': {err:#}"))
        }
    };
    if !table.has_columns(&[FEATURES[0], FEATURES[1], TARGET]) {
        return ctx.console.error(
            "The dataset must contain the columns: Experience_Years, Current_Salary and Future_Salary.",
        );
    }

    let model = match train_or_load_model(
        &table,
        &dataset_fingerprint(&bytes),
        &ctx.settings.data_file(MODEL_FILE),
    ) {
        Ok(model) => model,
        Err(err) => return ctx.console.error(&format!("{err:#}")),
    };

    ctx.console.subheader("Enter Your Data")?;
    let experience = ctx
        .console
        .number_input("Years of Experience", 0.0, 50.0, 5.0)?;
    let salary = ctx
        .console
        .number_input("Current Salary ($)", 1000.0, 50000.0, 5000.0)?;
    let prediction = model.predict(&[experience, salary]);

    ctx.console.subheader("Estimated Future Salary")?;
    ctx.console.write(&format!("$ {}", format_thousands(prediction)))?;

    ctx.console.subheader("Comparison with Dataset")?;
    let actual = table.number_pairs(FEATURES[0], TARGET);
    publish_chart(
        ctx,
        NAMESPACE,
        "salary_comparison.png",
        "Years of Experience vs Future Salary ($)",
        |path| scatter_chart(path, &actual, Some((experience, prediction))),
    )
}

#[cfg(test)]
mod tests {
    use crate::data::DataTable;
    use crate::projects::harness::Harness;
    use crate::projects::Project;
    use crate::stats::LinearModel;

    use super::{dataset_fingerprint, train_or_load_model, CachedModel};

    // Future = 1000 + 2 * years + 1.1 * salary
    const SALARIES: &str = "Experience_Years,Current_Salary,Future_Salary\n\
        1,3000,4302\n\
        2,3500,4854\n\
        3,3200,4526\n\
        4,4100,5518\n\
        6,5000,6512\n";

    #[test]
    fn fits_and_caches_with_fingerprint() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let model_path = temp.path().join("salary_model.json");
        let table = DataTable::from_csv_reader(SALARIES.as_bytes())?;
        let fingerprint = dataset_fingerprint(SALARIES.as_bytes());

        let model = train_or_load_model(&table, &fingerprint, &model_path)?;
        assert!((model.predict(&[5.0, 5000.0]) - 6510.0).abs() < 1e-6);

        let cached: CachedModel = serde_json::from_str(&std::fs::read_to_string(&model_path)?)?;
        assert_eq!(cached.dataset_sha256, fingerprint);
        assert_eq!(fingerprint.len(), 64);
        Ok(())
    }

    #[test]
    fn matching_cache_is_reused_and_stale_cache_refit() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let model_path = temp.path().join("salary_model.json");
        let table = DataTable::from_csv_reader(SALARIES.as_bytes())?;
        let planted = CachedModel {
            dataset_sha256: "abc".to_string(),
            model: LinearModel {
                intercept: 1.0,
                coefficients: vec![0.0, 0.0],
            },
        };
        std::fs::write(&model_path, serde_json::to_string(&planted)?)?;

        let reused = train_or_load_model(&table, "abc", &model_path)?;
        assert_eq!(reused.predict(&[5.0, 5000.0]), 1.0);

        let refit = train_or_load_model(&table, "def", &model_path)?;
        assert!((refit.predict(&[5.0, 5000.0]) - 6510.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn two_row_dataset_still_predicts() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        harness.write_data(
            "salary_data.csv",
            "Experience_Years,Current_Salary,Future_Salary\n1,3000,4302\n2,3500,4854\n",
        )?;
        let out = harness.render(Project::SalaryPrediction, "1\n3000\n")?;
        assert!(out.contains("$ 4,302.00"));
        assert!(!out.contains("[error]"));
        Ok(())
    }

    #[test]
    fn constant_salary_column_still_predicts() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        harness.write_data(
            "salary_data.csv",
            "Experience_Years,Current_Salary,Future_Salary\n\
             1,5000,5100\n2,5000,5200\n3,5000,5300\n",
        )?;
        let out = harness.render(Project::SalaryPrediction, "4\n5000\n")?;
        assert!(out.contains("$ 5,400.00"));
        Ok(())
    }

    #[test]
    fn unusable_dataset_is_reported_not_raised() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        std::fs::write(
            harness.settings.data_file("salary_data.csv"),
            b"Experience_Years,\xff\xfe\n1,2\n",
        )?;
        let out = harness.render(Project::SalaryPrediction, "")?;
        assert!(out.contains("[error] Could not read 'salary_data.csv'"));

        harness.write_data(
            "salary_data.csv",
            "Experience_Years,Current_Salary,Future_Salary\nn/a,n/a,n/a\n",
        )?;
        let out = harness.render(Project::SalaryPrediction, "")?;
        assert!(out.contains("[error] failed fitting salary model"));
        Ok(())
    }

    #[test]
    fn missing_dataset_is_reported() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        let out = harness.render(Project::SalaryPrediction, "")?;
        assert!(out.contains(
            "[error] Dataset not found! Please add the 'salary_data.csv' file to the 'data' folder."
        ));
        Ok(())
    }

    #[test]
    fn predicts_with_default_inputs() -> anyhow::Result<()> {
        let mut harness = Harness::new()?;
        harness.write_data("salary_data.csv", SALARIES)?;
        let out = harness.render(Project::SalaryPrediction, "")?;
        assert!(out.contains("$ 6,510.00"));
        assert!(harness.settings.data_file("salary_model.json").exists());
        assert!(harness
            .chart_path(Project::SalaryPrediction, "salary_comparison.png")
            .exists());

        let out = harness.render(Project::SalaryPrediction, "10\n20000\n")?;
        // 1000 + 20 + 22000
        assert!(out.contains("$ 23,020.00"));
        Ok(())
    }
}
