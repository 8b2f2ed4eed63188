//! End-to-end load pipeline tests: defaults, overrides, pruning, dynamic
//! sections, and ordering.

use confit::{ConfigFile, ConfigSchema, Field, Kind, Schema, Value};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct BossBar {
    enabled: bool,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Tool {
    material: String,
    #[serde(rename = "display-name")]
    display_name: String,
    lore: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ExampleConfig {
    enabled: bool,
    #[serde(rename = "countdown-seconds")]
    countdown_seconds: Vec<i32>,
    tool: Tool,
    #[serde(rename = "boss-bars")]
    boss_bars: HashMap<String, BossBar>,
}

fn boss_bar_schema() -> Schema {
    Schema::new(vec![
        Field::bool("enabled", true),
        Field::string("text", "Default"),
    ])
}

impl ConfigSchema for ExampleConfig {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::bool("enabled", false),
            Field::list("countdown-seconds", Kind::Int, vec![5, 4, 3, 2, 1]),
            Field::structure(
                "tool",
                Schema::new(vec![
                    Field::string("material", "STONE_AXE"),
                    Field::string("display-name", "Builder"),
                    Field::list("lore", Kind::Str, vec!["Line 1", "Line 2"]),
                ]),
            ),
            Field::map(
                "boss-bars",
                Kind::Struct(boss_bar_schema()),
                vec![
                    (
                        "pvp",
                        toml::toml! {
                            enabled = true
                            text = "PvP soon"
                        }
                        .into(),
                    ),
                    (
                        "nether",
                        toml::toml! {
                            enabled = false
                            text = "Nether locked"
                        }
                        .into(),
                    ),
                ],
            ),
        ])
    }
}

fn loader(dir: &TempDir) -> ConfigFile<ExampleConfig> {
    ConfigFile::new(dir.path(), "example.toml")
}

#[test]
fn missing_file_is_created_from_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let loaded = loader(&temp_dir).load().unwrap();

    let target = temp_dir.path().join("example.toml");
    assert!(target.exists(), "config file should be created");
    assert_eq!(loaded.countdown_seconds, vec![5, 4, 3, 2, 1]);
    assert_eq!(loaded.tool.material, "STONE_AXE");
    assert_eq!(loaded.boss_bars["nether"].text, "Nether locked");

    let text = fs::read_to_string(&target).unwrap();
    assert!(text.contains("countdown-seconds"));
    assert!(text.contains("boss-bars"));
}

#[test]
fn overrides_win_and_defaults_fill_the_rest() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("example.toml"),
        r#"
enabled = true
countdown-seconds = [10, 5]

[tool]
material = "DIAMOND_AXE"

[boss-bars.pvp]
text = "Custom"
"#,
    )
    .unwrap();

    let loaded = loader(&temp_dir).load().unwrap();

    assert!(loaded.enabled);
    assert_eq!(loaded.countdown_seconds, vec![10, 5]);
    assert_eq!(loaded.tool.material, "DIAMOND_AXE");
    // Unset fields come from defaults.
    assert_eq!(loaded.tool.display_name, "Builder");
    assert_eq!(loaded.boss_bars["pvp"].text, "Custom");
    assert!(loaded.boss_bars["pvp"].enabled);
    assert_eq!(loaded.boss_bars["nether"].text, "Nether locked");
}

#[test]
fn deprecated_keys_are_removed_and_new_keys_appended() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("example.toml"),
        "enabled = true\ncountdown-seconds = [1, 2]\ndeprecated-setting = true\n",
    )
    .unwrap();

    loader(&temp_dir).load().unwrap();

    let text = fs::read_to_string(temp_dir.path().join("example.toml")).unwrap();
    assert!(!text.contains("deprecated-setting"));
    assert!(text.contains("tool"));
    assert!(text.contains("boss-bars"));
}

#[test]
fn user_added_dynamic_keys_survive_rewrites() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("example.toml"),
        r#"
[boss-bars.event]
enabled = true
text = "Event starting"
"#,
    )
    .unwrap();

    let loaded = loader(&temp_dir).load().unwrap();
    assert_eq!(loaded.boss_bars["event"].text, "Event starting");

    // A second full cycle must keep the user's entry on disk.
    let reloaded = loader(&temp_dir).load().unwrap();
    assert_eq!(reloaded.boss_bars["event"].text, "Event starting");
    let text = fs::read_to_string(temp_dir.path().join("example.toml")).unwrap();
    assert!(text.contains("event"));
    assert!(text.contains("Event starting"));
}

#[test]
fn removed_dynamic_keys_stay_removed() {
    let temp_dir = TempDir::new().unwrap();
    // First load writes the seeded entries.
    loader(&temp_dir).load().unwrap();

    // User deletes one seeded boss bar entirely... which comes back,
    // because seeds are defaults. Deleting a key the seeds don't contain
    // is the case that must stick.
    fs::write(
        temp_dir.path().join("example.toml"),
        r#"
[boss-bars.mine]
enabled = true
text = "Mine"
"#,
    )
    .unwrap();
    loader(&temp_dir).load().unwrap();

    fs::write(
        temp_dir.path().join("example.toml"),
        fs::read_to_string(temp_dir.path().join("example.toml"))
            .unwrap()
            .replace("[boss-bars.mine]", "[boss-bars.kept]"),
    )
    .unwrap();
    let loaded = loader(&temp_dir).load().unwrap();
    assert!(loaded.boss_bars.contains_key("kept"));
    assert!(!loaded.boss_bars.contains_key("mine"));
    let text = fs::read_to_string(temp_dir.path().join("example.toml")).unwrap();
    assert!(!text.contains("[boss-bars.mine]"));
}

#[test]
fn second_load_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let first = loader(&temp_dir).load().unwrap();
    let text_after_first = fs::read_to_string(temp_dir.path().join("example.toml")).unwrap();

    let second = loader(&temp_dir).load().unwrap();
    let text_after_second = fs::read_to_string(temp_dir.path().join("example.toml")).unwrap();

    assert_eq!(first, second);
    assert_eq!(text_after_first, text_after_second);
}

#[test]
fn rewritten_key_order_follows_the_schema() {
    let temp_dir = TempDir::new().unwrap();
    // Scalars deliberately out of declared order.
    fs::write(
        temp_dir.path().join("example.toml"),
        r#"
countdown-seconds = [3]
enabled = true

[boss-bars.pvp]
text = "x"

[tool]
material = "IRON_AXE"
"#,
    )
    .unwrap();

    loader(&temp_dir).load().unwrap();

    let text = fs::read_to_string(temp_dir.path().join("example.toml")).unwrap();
    let position = |needle: &str| text.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
    assert!(position("enabled") < position("countdown-seconds"));
    assert!(position("[tool]") < position("[boss-bars"));
}

#[test]
fn write_if_absent_leaves_existing_files_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let original = "# my notes\nenabled = true\n";
    fs::write(temp_dir.path().join("example.toml"), original).unwrap();

    let loaded = loader(&temp_dir).write_if_absent().load().unwrap();
    assert!(loaded.enabled);
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("example.toml")).unwrap(),
        original
    );
}

#[test]
fn resolved_tree_answers_dotted_path_queries() {
    let temp_dir = TempDir::new().unwrap();
    let (_, resolved) = loader(&temp_dir).load_with_tree().unwrap();
    assert!(resolved.has("tool.material"));
    assert_eq!(resolved.get_str("tool.material"), Some("STONE_AXE"));
    assert_eq!(resolved.get_bool("boss-bars.nether.enabled"), Some(false));
    assert!(!resolved.has("no.such.path"));
}

mod mixed_overrides {
    use super::*;

    #[derive(Debug, PartialEq, Deserialize)]
    struct ToolName {
        name: String,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Scenario {
        enabled: bool,
        retries: Vec<i32>,
        tool: ToolName,
    }

    impl ConfigSchema for Scenario {
        fn schema() -> Schema {
            Schema::new(vec![
                Field::bool("enabled", false),
                Field::list("retries", Kind::Int, vec![1, 2, 3]),
                Field::structure("tool", Schema::new(vec![Field::string("name", "axe")])),
            ])
        }
    }

    #[test]
    fn partial_file_with_deprecated_key() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join("scenario.toml"),
            "retries = [9]\nextra = true\n",
        )
        .unwrap();

        let loaded: Scenario = ConfigFile::new(temp_dir.path(), "scenario.toml")
            .load()
            .unwrap();
        assert!(!loaded.enabled);
        assert_eq!(loaded.retries, vec![9]);
        assert_eq!(loaded.tool.name, "axe");

        let text = fs::read_to_string(temp_dir.path().join("scenario.toml")).unwrap();
        assert!(!text.contains("extra"));
        let rewritten: toml::Table = toml::from_str(&text).unwrap();
        assert_eq!(
            rewritten["tool"]["name"],
            Value::String("axe".to_string())
        );
        assert_eq!(rewritten["retries"], Value::Array(vec![Value::Integer(9)]));
    }
}
