/*
* 开发心理过程：
* 1. 打卡点的文字内容来自四张固定表：经文、反思题目、主题、历史
* 2. 内容表作为显式参数传入生成器，不使用全局单例
* 3. 反思题目至少两条，否则无法为同一打卡点抽出两道不同题目，属于启动时致命配置错误
*/

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{HuntError, HuntResult};

/// 经文条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub reference: String,
    pub text: String,
}

/// 装饰用的历史条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryNote {
    pub title: String,
    pub blurb: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTables {
    pub verses: Vec<Verse>,
    pub prompts: Vec<String>,
    pub themes: Vec<String>,
    #[serde(default)]
    pub histories: Vec<HistoryNote>,
}

fn verse(reference: &str, text: &str) -> Verse {
    Verse {
        reference: reference.to_string(),
        text: text.to_string(),
    }
}

fn history(title: &str, blurb: &str) -> HistoryNote {
    HistoryNote {
        title: title.to_string(),
        blurb: blurb.to_string(),
    }
}

impl ContentTables {
    /// 内置内容表
    pub fn builtin() -> Self {
        Self {
            verses: vec![
                verse("Psalm 46:10", "Be still, and know that I am God."),
                verse("Isaiah 40:31", "They that wait upon the Lord shall renew their strength; they shall mount up with wings as eagles."),
                verse("Matthew 5:14", "Ye are the light of the world. A city that is set on an hill cannot be hid."),
                verse("John 8:12", "I am the light of the world: he that followeth me shall not walk in darkness."),
                verse("Psalm 119:105", "Thy word is a lamp unto my feet, and a light unto my path."),
                verse("Proverbs 3:5", "Trust in the Lord with all thine heart; and lean not unto thine own understanding."),
                verse("Micah 6:8", "Do justly, and to love mercy, and to walk humbly with thy God."),
                verse("Matthew 11:28", "Come unto me, all ye that labour and are heavy laden, and I will give you rest."),
                verse("Romans 12:12", "Rejoicing in hope; patient in tribulation; continuing instant in prayer."),
                verse("Jeremiah 29:11", "For I know the thoughts that I think toward you, thoughts of peace, and not of evil."),
                verse("Psalm 23:1", "The Lord is my shepherd; I shall not want."),
                verse("Luke 15:4", "Doth not leave the ninety and nine in the wilderness, and go after that which is lost, until he find it?"),
            ],
            prompts: vec![
                "What caught your eye first when you arrived here?".to_string(),
                "Who do you think walks past this place every day?".to_string(),
                "What does rest look like for you this week?".to_string(),
                "Where have you seen kindness in this neighbourhood?".to_string(),
                "What would you want to say to a stranger standing here?".to_string(),
                "What are you searching for right now?".to_string(),
                "What is one thing you are grateful for in this moment?".to_string(),
                "How does this verse sit with what you see around you?".to_string(),
                "What would change if you slowed down here for ten minutes?".to_string(),
                "Who could you bring back to this spot, and why?".to_string(),
            ],
            themes: vec![
                "Harbour of Hope".to_string(),
                "Light in the Lanes".to_string(),
                "The Quiet Garden".to_string(),
                "Crossroads".to_string(),
                "Living Water".to_string(),
                "The Open Door".to_string(),
                "City on a Hill".to_string(),
                "Found".to_string(),
            ],
            histories: vec![
                history("First Landing", "Ships anchored in these waters long before the streets were laid out."),
                history("Sandstone Builders", "Much of the old city was cut from the yellow sandstone underfoot."),
                history("Market Days", "Traders once gathered nearby to sell produce brought in from the river farms."),
                history("The Tramlines", "Electric trams ran through these streets until the early 1960s."),
                history("Gardens by the Water", "Public gardens were set aside here for anyone to walk and rest."),
                history("Lamplighters", "Gas lamps lit the laneways each evening, tended one by one."),
                history("The Harbour Crossing", "Ferries were the only way across before the great bridge opened."),
                history("Neighbourhood Halls", "Local halls hosted dances, meetings and soup kitchens through hard years."),
            ],
        }
    }

    pub fn from_json_str(json: &str) -> HuntResult<Self> {
        let tables: ContentTables = serde_json::from_str(json)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn load_from_file(path: &Path) -> HuntResult<Self> {
        let content = fs::read_to_string(path)?;
        let tables = Self::from_json_str(&content)?;
        info!(
            "加载内容表 {:?}: {} 条经文, {} 道题目, {} 个主题",
            path,
            tables.verses.len(),
            tables.prompts.len(),
            tables.themes.len()
        );
        Ok(tables)
    }

    /// 启动时校验：至少一条经文、两道反思题目
    pub fn validate(&self) -> HuntResult<()> {
        if self.verses.is_empty() {
            return Err(HuntError::Content("经文表为空".to_string()));
        }

        if self.prompts.len() < 2 {
            return Err(HuntError::Content(format!(
                "反思题目至少需要2条, 实际 {} 条",
                self.prompts.len()
            )));
        }

        Ok(())
    }

    /// 按位置取主题，超出表长时使用合成名称
    pub fn theme_for(&self, index: usize) -> String {
        self.themes
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Discovery Point {}", index + 1))
    }

    /// 按位置取历史条目
    pub fn history_for(&self, index: usize) -> Option<HistoryNote> {
        self.histories.get(index).cloned()
    }
}

impl Default for ContentTables {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_tables() {
        let tables = ContentTables::builtin();
        assert!(tables.validate().is_ok());
        assert_eq!(tables.themes.len(), 8);
        assert_eq!(tables.histories.len(), 8);
        assert!(tables.verses.len() >= 8);
        assert!(tables.prompts.len() >= 8);
    }

    #[test]
    fn test_single_prompt_is_fatal() {
        let mut tables = ContentTables::builtin();
        tables.prompts.truncate(1);
        let err = tables.validate().unwrap_err();
        assert!(matches!(err, HuntError::Content(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_empty_verses_is_fatal() {
        let mut tables = ContentTables::builtin();
        tables.verses.clear();
        assert!(tables.validate().is_err());
    }

    #[test]
    fn test_theme_fallback() {
        let tables = ContentTables::builtin();
        assert_eq!(tables.theme_for(0), "Harbour of Hope");
        assert_eq!(tables.theme_for(8), "Discovery Point 9");
        assert!(tables.history_for(7).is_some());
        assert!(tables.history_for(8).is_none());
    }

    #[test]
    fn test_histories_are_optional_in_json() {
        let json = r#"{
            "verses": [{"reference": "Psalm 23:1", "text": "The Lord is my shepherd"}],
            "prompts": ["one", "two"],
            "themes": []
        }"#;
        let tables = ContentTables::from_json_str(json).unwrap();
        assert!(tables.histories.is_empty());
        assert_eq!(tables.theme_for(2), "Discovery Point 3");
    }

    #[test]
    fn test_load_from_file_validates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("content.json");
        let mut tables = ContentTables::builtin();
        tables.prompts = vec!["only one".to_string()];
        fs::write(&path, serde_json::to_string(&tables).unwrap()).unwrap();

        assert!(matches!(
            ContentTables::load_from_file(&path),
            Err(HuntError::Content(_))
        ));
    }
}
