//! Localized UI strings.
//!
//! Every [`TextKey`] must have an entry in every [`Locale`] table. The tables are
//! exhaustive `match` expressions, so adding a key without translating it is a
//! compile error rather than a silently blank label.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::ZhCn, Locale::En];

    /// Storage identifier, identical to the `lang` value the web client used.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::ZhCn => "zh-CN",
            Locale::En => "en",
        }
    }

    /// Name shown in the language selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Locale::ZhCn => "中文",
            Locale::En => "English",
        }
    }

    pub fn text(&self, key: TextKey) -> &'static str {
        match self {
            Locale::ZhCn => zh_cn(key),
            Locale::En => en(key),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown locale '{0}'")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::ALL
            .into_iter()
            .find(|locale| locale.code() == s)
            .ok_or_else(|| UnknownLocale(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextKey {
    Title,
    Subtitle,
    StatSpeed,
    StatRes,
    Params,
    Colormap,
    FocalInput,
    FocalAuto,
    FocalManual,
    FocalHint,
    OutputFormat,
    ModelStatus,
    ModelLoaded,
    ModelUnloaded,
    ReleaseGpu,
    TipsTitle,
    Tip1,
    Tip2,
    Tip3,
    Tip4,
    DropHint,
    ChooseFile,
    Clear,
    Process,
    Results,
    Original,
    DepthMap,
    ViewSide,
    ViewSlider,
    ViewDepth,
    Near,
    Far,
    MinDepth,
    MaxDepth,
    MeanDepth,
    Focal,
    InferTime,
    ImgSize,
    Downloads,
    Saved,
    Processing,
    Uploading,
    Inferring,
    Done,
    Error,
    Language,
}

impl TextKey {
    pub const ALL: [TextKey; 46] = [
        TextKey::Title,
        TextKey::Subtitle,
        TextKey::StatSpeed,
        TextKey::StatRes,
        TextKey::Params,
        TextKey::Colormap,
        TextKey::FocalInput,
        TextKey::FocalAuto,
        TextKey::FocalManual,
        TextKey::FocalHint,
        TextKey::OutputFormat,
        TextKey::ModelStatus,
        TextKey::ModelLoaded,
        TextKey::ModelUnloaded,
        TextKey::ReleaseGpu,
        TextKey::TipsTitle,
        TextKey::Tip1,
        TextKey::Tip2,
        TextKey::Tip3,
        TextKey::Tip4,
        TextKey::DropHint,
        TextKey::ChooseFile,
        TextKey::Clear,
        TextKey::Process,
        TextKey::Results,
        TextKey::Original,
        TextKey::DepthMap,
        TextKey::ViewSide,
        TextKey::ViewSlider,
        TextKey::ViewDepth,
        TextKey::Near,
        TextKey::Far,
        TextKey::MinDepth,
        TextKey::MaxDepth,
        TextKey::MeanDepth,
        TextKey::Focal,
        TextKey::InferTime,
        TextKey::ImgSize,
        TextKey::Downloads,
        TextKey::Saved,
        TextKey::Processing,
        TextKey::Uploading,
        TextKey::Inferring,
        TextKey::Done,
        TextKey::Error,
        TextKey::Language,
    ];
}

fn zh_cn(key: TextKey) -> &'static str {
    match key {
        TextKey::Title => "Depth Pro 深度估计",
        TextKey::Subtitle => "零样本单目深度估计 · 0.3秒生成2.25MP高精度深度图",
        TextKey::StatSpeed => "推理速度",
        TextKey::StatRes => "输出分辨率",
        TextKey::Params => "参数设置",
        TextKey::Colormap => "颜色映射",
        TextKey::FocalInput => "焦距设置",
        TextKey::FocalAuto => "自动估计",
        TextKey::FocalManual => "手动输入",
        TextKey::FocalHint => "留空则自动估计",
        TextKey::OutputFormat => "输出格式",
        TextKey::ModelStatus => "模型状态:",
        TextKey::ModelLoaded => "已加载",
        TextKey::ModelUnloaded => "未加载",
        TextKey::ReleaseGpu => "释放显存",
        TextKey::TipsTitle => "使用技巧",
        TextKey::Tip1 => "✓ 室内/近距离场景效果最佳",
        TextKey::Tip2 => "✓ 高分辨率图像细节更丰富",
        TextKey::Tip3 => "⚠ 远景(>20m)深度值仅供参考",
        TextKey::Tip4 => "✓ 支持 JPG/PNG/WebP/HEIC",
        TextKey::DropHint => "拖拽图像到此处，或点击选择",
        TextKey::ChooseFile => "选择图像",
        TextKey::Clear => "清除",
        TextKey::Process => "开始处理",
        TextKey::Results => "处理结果",
        TextKey::Original => "原图",
        TextKey::DepthMap => "深度图",
        TextKey::ViewSide => "并排",
        TextKey::ViewSlider => "滑动对比",
        TextKey::ViewDepth => "仅深度",
        TextKey::Near => "近",
        TextKey::Far => "远",
        TextKey::MinDepth => "最近距离",
        TextKey::MaxDepth => "最远距离",
        TextKey::MeanDepth => "平均深度",
        TextKey::Focal => "焦距",
        TextKey::InferTime => "推理耗时",
        TextKey::ImgSize => "图像尺寸",
        TextKey::Downloads => "下载",
        TextKey::Saved => "已保存",
        TextKey::Processing => "处理中...",
        TextKey::Uploading => "上传中...",
        TextKey::Inferring => "推理中...",
        TextKey::Done => "处理完成!",
        TextKey::Error => "处理失败",
        TextKey::Language => "语言",
    }
}

fn en(key: TextKey) -> &'static str {
    match key {
        TextKey::Title => "Depth Pro",
        TextKey::Subtitle => "Zero-shot Monocular Depth · 2.25MP depth map in 0.3s",
        TextKey::StatSpeed => "Inference",
        TextKey::StatRes => "Resolution",
        TextKey::Params => "Parameters",
        TextKey::Colormap => "Colormap",
        TextKey::FocalInput => "Focal Length",
        TextKey::FocalAuto => "Auto",
        TextKey::FocalManual => "Manual",
        TextKey::FocalHint => "Leave empty for auto estimation",
        TextKey::OutputFormat => "Output Format",
        TextKey::ModelStatus => "Model:",
        TextKey::ModelLoaded => "Loaded",
        TextKey::ModelUnloaded => "Not loaded",
        TextKey::ReleaseGpu => "Release GPU",
        TextKey::TipsTitle => "Tips",
        TextKey::Tip1 => "✓ Best for indoor/close-range",
        TextKey::Tip2 => "✓ Higher resolution = more details",
        TextKey::Tip3 => "⚠ Far scenes (>20m) depth is approximate",
        TextKey::Tip4 => "✓ Supports JPG/PNG/WebP/HEIC",
        TextKey::DropHint => "Drop image here or click to select",
        TextKey::ChooseFile => "Choose image",
        TextKey::Clear => "Clear",
        TextKey::Process => "Process",
        TextKey::Results => "Results",
        TextKey::Original => "Original",
        TextKey::DepthMap => "Depth Map",
        TextKey::ViewSide => "Side by side",
        TextKey::ViewSlider => "Slider",
        TextKey::ViewDepth => "Depth only",
        TextKey::Near => "Near",
        TextKey::Far => "Far",
        TextKey::MinDepth => "Min Depth",
        TextKey::MaxDepth => "Max Depth",
        TextKey::MeanDepth => "Mean Depth",
        TextKey::Focal => "Focal",
        TextKey::InferTime => "Inference",
        TextKey::ImgSize => "Image Size",
        TextKey::Downloads => "Downloads",
        TextKey::Saved => "Saved",
        TextKey::Processing => "Processing...",
        TextKey::Uploading => "Uploading...",
        TextKey::Inferring => "Inferring...",
        TextKey::Done => "Done!",
        TextKey::Error => "Failed",
        TextKey::Language => "Language",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_locale_round_trips_through_code() {
        for locale in Locale::ALL {
            assert_eq!(locale.code().parse::<Locale>(), Ok(locale));
        }
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_unknown_locale_message() {
        let err = "fr".parse::<Locale>().unwrap_err();
        assert_eq!(err, UnknownLocale("fr".to_string()));
        assert_eq!(err.to_string(), "unknown locale 'fr'");
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_every_key_is_translated() {
        for locale in Locale::ALL {
            for key in TextKey::ALL {
                assert!(
                    !locale.text(key).is_empty(),
                    "{:?} has no text for {:?}",
                    locale,
                    key
                );
            }
        }
    }

    #[test]
    fn test_key_list_has_no_duplicates() {
        let unique: HashSet<_> = TextKey::ALL.iter().collect();
        assert_eq!(unique.len(), TextKey::ALL.len());
    }

    #[test]
    fn test_failure_label() {
        assert_eq!(Locale::En.text(TextKey::Error), "Failed");
        assert_eq!(Locale::ZhCn.text(TextKey::Error), "处理失败");
    }

    #[test]
    fn test_serde_uses_storage_codes() {
        assert_eq!(serde_json::to_string(&Locale::ZhCn).unwrap(), "\"zh-CN\"");
        let locale: Locale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(locale, Locale::En);
    }
}
