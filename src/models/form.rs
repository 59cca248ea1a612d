use super::cadence::{Cadence, CadenceError};
use crate::api::ModelRecord;
use std::collections::BTreeMap;

/// 可选模型类型，第一个为默认值
pub const MODEL_TYPES: [&str; 4] = ["NBEATS", "TRANSFORMER", "LSTM", "ARIMA"];

/// 编辑已有模型时缺省的数值
const EDIT_DEFAULTS: (i64, i64, i64, i64, i64) = (14400, 120, 30, 7200, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit,
}

impl DialogMode {
    pub fn title(&self) -> &'static str {
        match self {
            DialogMode::Create => "Create New Model",
            DialogMode::Edit => "Edit Model",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            DialogMode::Create => "Create Model",
            DialogMode::Edit => "Update Model",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Id,
    Name,
    Description,
    ModelType,
    PastCovariates,
    Target,
    FutureCovariates,
    Status,
    TrainingHorizon,
    ForecastHorizon,
    UpdateFrequency,
    RetrainFrequency,
    SamplingRate,
}

impl FormField {
    pub const ALL: [FormField; 13] = [
        FormField::Id,
        FormField::Name,
        FormField::Description,
        FormField::ModelType,
        FormField::PastCovariates,
        FormField::Target,
        FormField::FutureCovariates,
        FormField::Status,
        FormField::TrainingHorizon,
        FormField::ForecastHorizon,
        FormField::UpdateFrequency,
        FormField::RetrainFrequency,
        FormField::SamplingRate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Id => "ID",
            FormField::Name => "Name",
            FormField::Description => "Description",
            FormField::ModelType => "Model Type",
            FormField::PastCovariates => "Past Covariates",
            FormField::Target => "Target",
            FormField::FutureCovariates => "Future Covariates",
            FormField::Status => "Status",
            FormField::TrainingHorizon => "Training Horizon",
            FormField::ForecastHorizon => "Forecast Horizon",
            FormField::UpdateFrequency => "Update Frequency",
            FormField::RetrainFrequency => "Retrain Frequency",
            FormField::SamplingRate => "Sampling Rate",
        }
    }

    /// 使用多选框编辑的字段
    pub fn is_stream_list(&self) -> bool {
        matches!(
            self,
            FormField::PastCovariates
                | FormField::Target
                | FormField::FutureCovariates
                | FormField::Status
        )
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, FormField::FutureCovariates | FormField::Status)
    }
}

/// 模型编辑表单，数值字段以文本缓存
#[derive(Debug, Clone)]
pub struct ModelForm {
    pub mode: DialogMode,
    pub id: String,
    pub name: String,
    pub description: String,
    pub model_type: String,
    pub past_covariates: Vec<String>,
    pub target: Vec<String>,
    pub future_covariates: Vec<String>,
    pub status: Vec<String>,
    pub training_horizon: String,
    pub forecast_horizon: String,
    pub update_frequency: String,
    pub retrain_frequency: String,
    pub sampling_rate: String,
    pub errors: BTreeMap<FormField, String>,
    pub focus: FormField,
}

impl ModelForm {
    pub fn create() -> Self {
        Self {
            mode: DialogMode::Create,
            id: String::new(),
            name: String::new(),
            description: String::new(),
            model_type: MODEL_TYPES[0].to_string(),
            past_covariates: Vec::new(),
            target: Vec::new(),
            future_covariates: Vec::new(),
            status: Vec::new(),
            training_horizon: "0".to_string(),
            forecast_horizon: "0".to_string(),
            update_frequency: "0".to_string(),
            retrain_frequency: "0".to_string(),
            sampling_rate: "0".to_string(),
            errors: BTreeMap::new(),
            focus: FormField::Id,
        }
    }

    pub fn edit(record: &ModelRecord) -> Self {
        let (th, fh, uf, rf, sr) = EDIT_DEFAULTS;
        let number = |v: Option<i64>, d: i64| v.filter(|n| *n != 0).unwrap_or(d).to_string();
        let cadence = |v: &Option<Cadence>, d: i64| match v {
            Some(Cadence::Period(0)) | None => d.to_string(),
            Some(c) => c.as_input(),
        };
        Self {
            mode: DialogMode::Edit,
            id: record.id.clone(),
            name: record.name.clone(),
            description: record.description.clone(),
            model_type: if record.model_type.trim().is_empty() {
                MODEL_TYPES[0].to_string()
            } else {
                record.model_type.clone()
            },
            past_covariates: record.past_covariates.clone(),
            target: record.target.clone(),
            future_covariates: record.future_covariates.clone(),
            status: record.status.clone(),
            training_horizon: number(record.training_horizon, th),
            forecast_horizon: number(record.forecast_horizon, fh),
            update_frequency: cadence(&record.update_frequency, uf),
            retrain_frequency: cadence(&record.retrain_frequency, rf),
            sampling_rate: number(record.sampling_rate, sr),
            errors: BTreeMap::new(),
            focus: FormField::Name,
        }
    }

    /// 编辑模式下 ID 只读
    pub fn is_read_only(&self, field: FormField) -> bool {
        field == FormField::Id && self.mode == DialogMode::Edit
    }

    pub fn text(&self, field: FormField) -> String {
        match field {
            FormField::Id => self.id.clone(),
            FormField::Name => self.name.clone(),
            FormField::Description => self.description.clone(),
            FormField::ModelType => self.model_type.clone(),
            FormField::PastCovariates => self.past_covariates.join(", "),
            FormField::Target => self.target.join(", "),
            FormField::FutureCovariates => self.future_covariates.join(", "),
            FormField::Status => self.status.join(", "),
            FormField::TrainingHorizon => self.training_horizon.clone(),
            FormField::ForecastHorizon => self.forecast_horizon.clone(),
            FormField::UpdateFrequency => self.update_frequency.clone(),
            FormField::RetrainFrequency => self.retrain_frequency.clone(),
            FormField::SamplingRate => self.sampling_rate.clone(),
        }
    }

    fn buffer_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Id => Some(&mut self.id),
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::TrainingHorizon => Some(&mut self.training_horizon),
            FormField::ForecastHorizon => Some(&mut self.forecast_horizon),
            FormField::UpdateFrequency => Some(&mut self.update_frequency),
            FormField::RetrainFrequency => Some(&mut self.retrain_frequency),
            FormField::SamplingRate => Some(&mut self.sampling_rate),
            _ => None,
        }
    }

    pub fn list_mut(&mut self, field: FormField) -> Option<&mut Vec<String>> {
        match field {
            FormField::PastCovariates => Some(&mut self.past_covariates),
            FormField::Target => Some(&mut self.target),
            FormField::FutureCovariates => Some(&mut self.future_covariates),
            FormField::Status => Some(&mut self.status),
            _ => None,
        }
    }

    pub fn list(&self, field: FormField) -> &[String] {
        match field {
            FormField::PastCovariates => &self.past_covariates,
            FormField::Target => &self.target,
            FormField::FutureCovariates => &self.future_covariates,
            FormField::Status => &self.status,
            _ => &[],
        }
    }

    /// 修改字段时清掉该字段的错误
    fn touch(&mut self, field: FormField) {
        self.errors.remove(&field);
    }

    pub fn push_char(&mut self, c: char) {
        let field = self.focus;
        if self.is_read_only(field) {
            return;
        }
        if let Some(buf) = self.buffer_mut(field) {
            buf.push(c);
            self.touch(field);
        }
    }

    pub fn pop_char(&mut self) {
        let field = self.focus;
        if self.is_read_only(field) {
            return;
        }
        if let Some(buf) = self.buffer_mut(field) {
            buf.pop();
            self.touch(field);
        }
    }

    pub fn set_text(&mut self, field: FormField, value: &str) {
        if self.is_read_only(field) {
            return;
        }
        if let Some(buf) = self.buffer_mut(field) {
            *buf = value.to_string();
            self.touch(field);
        }
    }

    pub fn cycle_model_type(&mut self, forward: bool) {
        let idx = MODEL_TYPES
            .iter()
            .position(|t| *t == self.model_type)
            .unwrap_or(0);
        let n = MODEL_TYPES.len();
        let next = if forward { (idx + 1) % n } else { (idx + n - 1) % n };
        self.model_type = MODEL_TYPES[next].to_string();
        self.touch(FormField::ModelType);
    }

    /// 多选字段切换一个流
    pub fn toggle_stream(&mut self, field: FormField, id: &str) {
        if let Some(list) = self.list_mut(field) {
            crate::picker::toggle(list, id);
            self.touch(field);
        }
    }

    pub fn focus_next(&mut self) {
        let idx = FormField::ALL.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FormField::ALL[(idx + 1) % FormField::ALL.len()];
        if self.is_read_only(self.focus) {
            self.focus_next();
        }
    }

    pub fn focus_prev(&mut self) {
        let n = FormField::ALL.len();
        let idx = FormField::ALL.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = FormField::ALL[(idx + n - 1) % n];
        if self.is_read_only(self.focus) {
            self.focus_prev();
        }
    }

    /// 校验全部字段，返回字段到错误信息的映射
    pub fn validate(&self) -> BTreeMap<FormField, String> {
        let mut errors = BTreeMap::new();
        let mut required = |field: FormField, value: &str, msg: &str| {
            if value.trim().is_empty() {
                errors.insert(field, msg.to_string());
            }
        };
        required(FormField::Name, &self.name, "Name is required");
        required(FormField::Description, &self.description, "Description is required");
        required(FormField::Id, &self.id, "ID is required");
        required(FormField::ModelType, &self.model_type, "Model type is required");

        if self.past_covariates.is_empty() {
            errors.insert(
                FormField::PastCovariates,
                "At least one past covariate is required".to_string(),
            );
        }
        if self.target.is_empty() {
            errors.insert(FormField::Target, "At least one target is required".to_string());
        }

        for (field, text, what) in [
            (FormField::TrainingHorizon, &self.training_horizon, "Training horizon"),
            (FormField::ForecastHorizon, &self.forecast_horizon, "Forecast horizon"),
            (FormField::SamplingRate, &self.sampling_rate, "Sampling rate"),
        ] {
            if positive(text).is_none() {
                errors.insert(field, format!("{} must be positive", what));
            }
        }

        for (field, text, what) in [
            (FormField::UpdateFrequency, &self.update_frequency, "Update frequency"),
            (FormField::RetrainFrequency, &self.retrain_frequency, "Retrain frequency"),
        ] {
            match Cadence::parse(text) {
                Ok(_) => {}
                Err(CadenceError::NotPositive) => {
                    errors.insert(field, format!("{} must be positive", what));
                }
                Err(e) => {
                    errors.insert(field, format!("{}: {}", what, e));
                }
            }
        }
        errors
    }

    /// 校验并生成提交记录；有错误时写入 errors 并返回 None
    pub fn submit(&mut self) -> Option<ModelRecord> {
        let errors = self.validate();
        if !errors.is_empty() {
            if let Some(first) = errors.keys().next() {
                self.focus = *first;
            }
            self.errors = errors;
            return None;
        }
        self.errors.clear();
        Some(ModelRecord {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            model_type: self.model_type.clone(),
            past_covariates: self.past_covariates.clone(),
            target: self.target.clone(),
            future_covariates: self.future_covariates.clone(),
            status: self.status.clone(),
            training_horizon: positive(&self.training_horizon),
            forecast_horizon: positive(&self.forecast_horizon),
            update_frequency: Cadence::parse(&self.update_frequency).ok(),
            retrain_frequency: Cadence::parse(&self.retrain_frequency).ok(),
            sampling_rate: positive(&self.sampling_rate),
        })
    }
}

fn positive(text: &str) -> Option<i64> {
    text.trim().parse::<i64>().ok().filter(|n| *n > 0)
}
