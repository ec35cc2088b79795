//! Render status snapshots into display content.

use std::time::SystemTime;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{dao::models::Target, provider::models::StatusSnapshot};

use super::{DisplayContent, Embed, EmbedField, SelectOption};

/// Title shared by every rendering of the status message.
const TITLE: &str = "Game Server Status";
/// Select menus cap out at 25 options on the platform side.
const MENU_LIMIT: usize = 25;
/// Option labels cap out at 100 characters on the platform side.
const LABEL_LIMIT: usize = 100;

/// Build the full display content for one snapshot plus the target menu.
pub fn render_status(
    snapshot: &StatusSnapshot,
    targets: &[Target],
    selected_id: Option<&str>,
) -> DisplayContent {
    DisplayContent {
        embed: render_embed(snapshot),
        menu: render_menu(targets, selected_id),
    }
}

fn render_embed(snapshot: &StatusSnapshot) -> Embed {
    let updated = format_timestamp();

    if snapshot.online {
        Embed {
            title: TITLE.to_string(),
            description: format!("✅ **ONLINE**\nUpdated: {updated}"),
            fields: vec![
                EmbedField {
                    name: "Name".into(),
                    value: snapshot.name.clone(),
                    inline: false,
                },
                EmbedField {
                    name: "Players".into(),
                    value: format!(
                        "{}/{}",
                        count_or_unknown(snapshot.players),
                        count_or_unknown(snapshot.max_players)
                    ),
                    inline: true,
                },
                EmbedField {
                    name: "Time (in-game)".into(),
                    value: snapshot.in_game_time.clone().unwrap_or_else(|| "—".into()),
                    inline: true,
                },
                EmbedField {
                    name: "Game Port".into(),
                    value: format!("`{}`", snapshot.endpoint.as_deref().unwrap_or("—")),
                    inline: false,
                },
                EmbedField {
                    name: "Source".into(),
                    value: snapshot.source.clone(),
                    inline: true,
                },
            ],
        }
    } else {
        let mut fields = Vec::new();
        if let Some(error) = snapshot.error.as_deref() {
            fields.push(EmbedField {
                name: "Error".into(),
                value: format!("`{error}`"),
                inline: false,
            });
        }
        fields.push(EmbedField {
            name: "Source".into(),
            value: snapshot.source.clone(),
            inline: true,
        });

        Embed {
            title: TITLE.to_string(),
            description: format!("❌ **OFFLINE / NOT RESPONDING**\nUpdated: {updated}"),
            fields,
        }
    }
}

fn render_menu(targets: &[Target], selected_id: Option<&str>) -> Vec<SelectOption> {
    targets
        .iter()
        .take(MENU_LIMIT)
        .map(|target| SelectOption {
            label: truncate(&target.name, LABEL_LIMIT),
            value: target.id.clone(),
            selected: selected_id == Some(target.id.as_str()),
        })
        .collect()
}

fn truncate(value: &str, limit: usize) -> String {
    value.chars().take(limit).collect()
}

fn count_or_unknown(count: Option<u32>) -> String {
    count.map_or_else(|| "?".to_string(), |value| value.to_string())
}

fn format_timestamp() -> String {
    OffsetDateTime::from(SystemTime::now())
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn online_snapshot() -> StatusSnapshot {
        StatusSnapshot {
            target_id: "1".into(),
            online: true,
            name: "Pripyat Nights".into(),
            players: Some(42),
            max_players: Some(60),
            endpoint: Some("198.51.100.7:2302".into()),
            in_game_time: Some("08:45".into()),
            source: crate::provider::SOURCE_NAME.to_string(),
            error: None,
        }
    }

    fn targets(ids: &[&str]) -> Vec<Target> {
        ids.iter()
            .map(|id| Target {
                id: (*id).into(),
                name: format!("Server {id}"),
            })
            .collect()
    }

    #[test]
    fn online_embed_carries_player_and_endpoint_fields() {
        let embed = render_embed(&online_snapshot());

        assert!(embed.description.starts_with("✅"));
        let players = embed.fields.iter().find(|f| f.name == "Players").unwrap();
        assert_eq!(players.value, "42/60");
        let port = embed.fields.iter().find(|f| f.name == "Game Port").unwrap();
        assert_eq!(port.value, "`198.51.100.7:2302`");
    }

    #[test]
    fn missing_counts_render_as_unknown() {
        let snapshot = StatusSnapshot {
            players: None,
            max_players: None,
            ..online_snapshot()
        };
        let embed = render_embed(&snapshot);
        let players = embed.fields.iter().find(|f| f.name == "Players").unwrap();
        assert_eq!(players.value, "?/?");
    }

    #[test]
    fn offline_embed_carries_the_error() {
        let snapshot = StatusSnapshot::failure("1", "no route to provider");
        let embed = render_embed(&snapshot);

        assert!(embed.description.starts_with("❌"));
        let error = embed.fields.iter().find(|f| f.name == "Error").unwrap();
        assert_eq!(error.value, "`no route to provider`");
    }

    #[test]
    fn menu_marks_the_selection_and_caps_the_length() {
        let many: Vec<String> = (0..30).map(|n| n.to_string()).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let menu = render_menu(&targets(&refs), Some("3"));

        assert_eq!(menu.len(), 25);
        assert!(menu.iter().find(|o| o.value == "3").unwrap().selected);
        assert_eq!(menu.iter().filter(|o| o.selected).count(), 1);
    }
}
