use crate::economy::EconomyDelta;
use crate::state::Economy;
use crate::world_map::{Node, NodeId, NodeKind};

pub const CALM_COST: u64 = 80;
pub const CALM_HEAT: i32 = -15;
pub const BARGAIN_HEAT: i32 = 8;
pub const RETREAT_HEAT: i32 = -6;
pub const GOSSIP_FRAGS: i64 = 1;
const MISSIONS_PER_FRAGMENT: u32 = 2;

const ROSTER: [(&str, &str); 5] = [
    ("NYX", "Fixer // encrypted VOIP"),
    ("GHOST", "Unknown // interference"),
    ("MARA", "Courier // street runner"),
    ("DOC K", "Ripperdoc // black clinic"),
    ("ARASAKA", "Security AI // corp wall"),
];
const UNKNOWN_ROLE: &str = "Signal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoryFragment {
    pub title: &'static str,
    pub text: &'static str,
}

pub const STORY: [StoryFragment; 6] = [
    StoryFragment {
        title: "PROLOG",
        text: "Daylight in Night City feels staged. NYX calls you a 'runner', but the city calls you a 'resource'.",
    },
    StoryFragment {
        title: "FRAGMENT 01",
        text: "A clean access key. Too clean. Someone wants you inside Arasaka's perimeter - fast.",
    },
    StoryFragment {
        title: "FRAGMENT 02",
        text: "GHOST pings you: 'NYX isn't your friend. She's a door.'",
    },
    StoryFragment {
        title: "FRAGMENT 03",
        text: "MARA mentions the sunset: 'When the city turns orange, the scanners wake up.'",
    },
    StoryFragment {
        title: "FRAGMENT 04",
        text: "DOC K upgrades your deck and laughs: 'Everyone wants Arasaka. Nobody wants the price.'",
    },
    StoryFragment {
        title: "FRAGMENT 05",
        text: "A corp signature: ARASAKA MAINFRAME. The route ends where the sky goes dark.",
    },
];

pub fn role_for(speaker: &str) -> &'static str {
    ROSTER
        .iter()
        .find(|(name, _)| *name == speaker)
        .map_or(UNKNOWN_ROLE, |(_, role)| *role)
}

/// One new fragment unlocks every two completed missions.
pub fn story_fragment(missions_done: u32) -> &'static StoryFragment {
    let index = (missions_done / MISSIONS_PER_FRAGMENT) as usize;
    &STORY[index.min(STORY.len() - 1)]
}

pub fn mood_line(global_progress: f32) -> &'static str {
    if global_progress < 0.35 {
        "Mood: Clean daylight. The dirt is hidden."
    } else if global_progress < 0.7 {
        "Mood: Sunset bleed. Neon fights the sun."
    } else {
        "Mood: Night shift. City gets loud. You get hunted."
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogChoice {
    Start,
    Bargain,
    Gossip,
    Calm,
    Retreat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogOption {
    pub choice: DialogChoice,
    pub label: &'static str,
}

pub fn choices_for(kind: NodeKind) -> Vec<DialogOption> {
    let option = |choice, label| DialogOption { choice, label };
    match kind {
        NodeKind::Mission => vec![
            option(DialogChoice::Start, "Start mission [ Risk / Reward ]"),
            option(DialogChoice::Bargain, "Ask for better payout [ Adds Heat ]"),
        ],
        NodeKind::Npc => vec![
            option(DialogChoice::Gossip, "Ask about Arasaka route [ Story + ]"),
            option(DialogChoice::Calm, "Lower heat [ -80 E$ ]"),
        ],
        NodeKind::Boss => vec![
            option(DialogChoice::Start, "Break through [ Boss Mission ]"),
            option(DialogChoice::Retreat, "Back off [ Reduce Heat slightly ]"),
        ],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub node_id: NodeId,
    pub speaker: String,
    pub role: &'static str,
    pub lines: Vec<String>,
    pub choices: Vec<DialogOption>,
}

impl Dialog {
    pub fn option(&self, index: usize) -> Option<DialogOption> {
        self.choices.get(index).copied()
    }
}

pub fn open_dialog(node: &Node, missions_done: u32, global_progress: f32) -> Dialog {
    let fragment = story_fragment(missions_done);
    let node_line = match node.kind {
        NodeKind::Mission => r#"NYX: "We do this fast. Grab data. Leave heat behind.""#.to_string(),
        NodeKind::Boss => {
            r#"ARASAKA: "Unauthorized signal. Containment protocols armed.""#.to_string()
        }
        NodeKind::Npc => format!("{}: \"{}\"", node.speaker, node.tag),
    };
    Dialog {
        node_id: node.id.clone(),
        speaker: node.speaker.clone(),
        role: role_for(&node.speaker),
        lines: vec![
            format!("[ LOCATION: {} ]", node.name.to_uppercase()),
            node_line,
            format!("- {} -", fragment.title),
            fragment.text.to_string(),
            mood_line(global_progress).to_string(),
        ],
        choices: choices_for(node.kind),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceEffect {
    StartMission,
    Apply {
        delta: EconomyDelta,
        notice: &'static str,
        /// Next mission from this node pays the bargain bonus.
        bargain: bool,
    },
    Insufficient {
        needed: u64,
    },
}

/// Pure; the caller merges the delta.
pub fn resolve_choice(choice: DialogChoice, economy: &Economy) -> ChoiceEffect {
    match choice {
        DialogChoice::Start => ChoiceEffect::StartMission,
        DialogChoice::Bargain => ChoiceEffect::Apply {
            delta: EconomyDelta::heat(BARGAIN_HEAT),
            notice: "NYX: 'Fine. But scanners will notice.' [ Heat +8% ]",
            bargain: true,
        },
        DialogChoice::Gossip => ChoiceEffect::Apply {
            delta: EconomyDelta::new(0, 0, GOSSIP_FRAGS),
            notice: "Fragment gained. [ Story +1 ]",
            bargain: false,
        },
        DialogChoice::Calm if economy.money >= CALM_COST => ChoiceEffect::Apply {
            delta: EconomyDelta::new(-(CALM_COST as i64), CALM_HEAT, 0),
            notice: "Heat cooled down. [ -80 E$, -15% Heat ]",
            bargain: false,
        },
        DialogChoice::Calm => ChoiceEffect::Insufficient { needed: CALM_COST },
        DialogChoice::Retreat => ChoiceEffect::Apply {
            delta: EconomyDelta::heat(RETREAT_HEAT),
            notice: "Retreating. [ Heat -6% ]",
            bargain: false,
        },
    }
}

pub fn archive_line(speaker: &str, label: &str, outcome: &str) -> String {
    format!("[{speaker}] {label} -> {outcome}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::MissionKind;
    use engine::Vec2;

    fn node(kind: NodeKind, speaker: &str) -> Node {
        Node {
            id: NodeId::new("N1"),
            kind,
            name: "Neon Gate".to_string(),
            speaker: speaker.to_string(),
            tag: "Clean start. Too clean.".to_string(),
            position: Vec2::ZERO,
            mission: kind.offers_mission().then_some(MissionKind::CachePop),
            alive: true,
        }
    }

    #[test]
    fn npc_dialog_lines_follow_location_tag_story_mood() {
        let dialog = open_dialog(&node(NodeKind::Npc, "NYX"), 0, 0.0);
        assert_eq!(dialog.role, "Fixer // encrypted VOIP");
        assert_eq!(
            dialog.lines,
            vec![
                "[ LOCATION: NEON GATE ]".to_string(),
                "NYX: \"Clean start. Too clean.\"".to_string(),
                "- PROLOG -".to_string(),
                STORY[0].text.to_string(),
                "Mood: Clean daylight. The dirt is hidden.".to_string(),
            ]
        );
        let choices: Vec<_> = dialog.choices.iter().map(|option| option.choice).collect();
        assert_eq!(choices, vec![DialogChoice::Gossip, DialogChoice::Calm]);
    }

    #[test]
    fn boss_and_mission_nodes_use_fixed_voice_lines() {
        let boss = open_dialog(&node(NodeKind::Boss, "ARASAKA"), 0, 0.0);
        assert!(boss.lines[1].starts_with("ARASAKA: \"Unauthorized signal."));
        assert_eq!(boss.choices[0].label, "Break through [ Boss Mission ]");
        assert_eq!(boss.option(1).map(|o| o.choice), Some(DialogChoice::Retreat));
        assert_eq!(boss.option(2), None);

        let mission = open_dialog(&node(NodeKind::Mission, "GHOST"), 0, 0.0);
        assert!(mission.lines[1].starts_with("NYX: \"We do this fast."));
        assert_eq!(mission.choices[1].choice, DialogChoice::Bargain);
    }

    #[test]
    fn unknown_speaker_gets_signal_role() {
        assert_eq!(role_for("NOBODY"), "Signal");
        assert_eq!(role_for("DOC K"), "Ripperdoc // black clinic");
    }

    #[test]
    fn fragments_unlock_every_two_missions_and_cap() {
        assert_eq!(story_fragment(0).title, "PROLOG");
        assert_eq!(story_fragment(1).title, "PROLOG");
        assert_eq!(story_fragment(2).title, "FRAGMENT 01");
        assert_eq!(story_fragment(10).title, "FRAGMENT 05");
        assert_eq!(story_fragment(u32::MAX).title, "FRAGMENT 05");
    }

    #[test]
    fn mood_thresholds() {
        assert!(mood_line(0.34).contains("daylight"));
        assert!(mood_line(0.35).contains("Sunset"));
        assert!(mood_line(0.69).contains("Sunset"));
        assert!(mood_line(0.7).contains("Night shift"));
    }

    #[test]
    fn calm_requires_funds() {
        let broke = Economy {
            money: 79,
            ..Economy::default()
        };
        assert_eq!(
            resolve_choice(DialogChoice::Calm, &broke),
            ChoiceEffect::Insufficient { needed: 80 }
        );

        let flush = Economy {
            money: 80,
            heat: 40,
            frags: 0,
        };
        match resolve_choice(DialogChoice::Calm, &flush) {
            ChoiceEffect::Apply { delta, .. } => assert_eq!(delta, EconomyDelta::new(-80, -15, 0)),
            other => panic!("unexpected effect {other:?}"),
        }
    }

    #[test]
    fn bargain_marks_next_payout() {
        match resolve_choice(DialogChoice::Bargain, &Economy::default()) {
            ChoiceEffect::Apply { delta, bargain, .. } => {
                assert!(bargain);
                assert_eq!(delta.heat, 8);
            }
            other => panic!("unexpected effect {other:?}"),
        }
        assert_eq!(
            resolve_choice(DialogChoice::Start, &Economy::default()),
            ChoiceEffect::StartMission
        );
    }

    #[test]
    fn archive_line_format() {
        assert_eq!(
            archive_line("NYX", "Lower heat [ -80 E$ ]", "Heat cooled down."),
            "[NYX] Lower heat [ -80 E$ ] -> Heat cooled down."
        );
    }
}
