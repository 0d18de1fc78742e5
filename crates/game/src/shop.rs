use thiserror::Error;

use crate::state::{Economy, Upgrades};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeKind {
    Buffer,
    Amplifier,
    Pulse,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 3] = [UpgradeKind::Buffer, UpgradeKind::Amplifier, UpgradeKind::Pulse];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            UpgradeKind::Buffer => "NEURAL BUFFER",
            UpgradeKind::Amplifier => "SIGNAL AMPLIFIER",
            UpgradeKind::Pulse => "PULSE OVERCLOCK",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            UpgradeKind::Buffer => "+2s mission timer per level",
            UpgradeKind::Amplifier => "Larger hit radius on mission targets",
            UpgradeKind::Pulse => "Tap top-left in mission: slow time 3s",
        }
    }

    pub fn base_cost(self) -> u64 {
        match self {
            UpgradeKind::Buffer => 180,
            UpgradeKind::Amplifier => 240,
            UpgradeKind::Pulse => 650,
        }
    }

    pub fn max_level(self) -> u32 {
        match self {
            UpgradeKind::Buffer | UpgradeKind::Amplifier => 5,
            UpgradeKind::Pulse => 1,
        }
    }
}

impl Upgrades {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Buffer => self.buffer,
            UpgradeKind::Amplifier => self.amplifier,
            UpgradeKind::Pulse => self.pulse,
        }
    }

    /// Caps every level at its kind's maximum; levels from an edited save
    /// can exceed it.
    pub fn clamp_levels(&mut self) {
        for kind in UpgradeKind::ALL {
            let level = self.level_mut(kind);
            *level = (*level).min(kind.max_level());
        }
    }

    fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::Buffer => &mut self.buffer,
            UpgradeKind::Amplifier => &mut self.amplifier,
            UpgradeKind::Pulse => &mut self.pulse,
        }
    }
}

/// `floor(base * 1.6^level)` in integer arithmetic. Saturates for absurd levels.
pub fn upgrade_cost(kind: UpgradeKind, level: u32) -> u64 {
    let scaled = 16u128
        .checked_pow(level)
        .zip(10u128.checked_pow(level))
        .and_then(|(numerator, denominator)| {
            u128::from(kind.base_cost())
                .checked_mul(numerator)
                .map(|value| value / denominator)
        });
    scaled
        .and_then(|value| u64::try_from(value).ok())
        .unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopOffer {
    pub kind: UpgradeKind,
    pub level: u32,
    /// `None` once maxed.
    pub cost: Option<u64>,
    pub affordable: bool,
}

pub fn offers(upgrades: &Upgrades, economy: &Economy) -> Vec<ShopOffer> {
    UpgradeKind::ALL
        .into_iter()
        .map(|kind| {
            let level = upgrades.level(kind);
            let cost = (level < kind.max_level()).then(|| upgrade_cost(kind, level));
            ShopOffer {
                kind,
                level,
                cost,
                affordable: cost.is_some_and(|cost| economy.money >= cost),
            }
        })
        .collect()
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("{} IS MAXED.", .0.title())]
    Maxed(UpgradeKind),
    #[error("INSUFFICIENT FUNDS. NEED {cost} E$, HAVE {available} E$.")]
    InsufficientFunds { cost: u64, available: u64 },
}

/// Deducts the cost and raises the level. Returns the amount paid.
pub fn purchase(
    upgrades: &mut Upgrades,
    economy: &mut Economy,
    kind: UpgradeKind,
) -> Result<u64, PurchaseError> {
    let level = upgrades.level(kind);
    if level >= kind.max_level() {
        return Err(PurchaseError::Maxed(kind));
    }
    let cost = upgrade_cost(kind, level);
    if economy.money < cost {
        return Err(PurchaseError::InsufficientFunds {
            cost,
            available: economy.money,
        });
    }
    economy.money -= cost;
    *upgrades.level_mut(kind) = level + 1;
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_grows_by_one_point_six_and_floors() {
        assert_eq!(upgrade_cost(UpgradeKind::Buffer, 0), 180);
        assert_eq!(upgrade_cost(UpgradeKind::Buffer, 1), 288);
        assert_eq!(upgrade_cost(UpgradeKind::Buffer, 2), 460);
        assert_eq!(upgrade_cost(UpgradeKind::Amplifier, 3), 983);
        assert_eq!(upgrade_cost(UpgradeKind::Pulse, 0), 650);
        assert_eq!(upgrade_cost(UpgradeKind::Buffer, 200), u64::MAX);
    }

    #[test]
    fn purchase_deducts_and_levels_up() {
        let mut upgrades = Upgrades::default();
        let mut economy = Economy {
            money: 500,
            ..Economy::default()
        };
        assert_eq!(purchase(&mut upgrades, &mut economy, UpgradeKind::Buffer), Ok(180));
        assert_eq!(upgrades.buffer, 1);
        assert_eq!(economy.money, 320);
        assert_eq!(purchase(&mut upgrades, &mut economy, UpgradeKind::Buffer), Ok(288));
        assert_eq!(economy.money, 32);
    }

    #[test]
    fn insufficient_funds_changes_nothing() {
        let mut upgrades = Upgrades::default();
        let mut economy = Economy {
            money: 100,
            ..Economy::default()
        };
        assert_eq!(
            purchase(&mut upgrades, &mut economy, UpgradeKind::Pulse),
            Err(PurchaseError::InsufficientFunds {
                cost: 650,
                available: 100
            })
        );
        assert_eq!(upgrades, Upgrades::default());
        assert_eq!(economy.money, 100);
    }

    #[test]
    fn maxed_upgrade_is_rejected_and_offered_without_cost() {
        let mut upgrades = Upgrades {
            pulse: 1,
            ..Upgrades::default()
        };
        let mut economy = Economy {
            money: 10_000,
            ..Economy::default()
        };
        assert_eq!(
            purchase(&mut upgrades, &mut economy, UpgradeKind::Pulse),
            Err(PurchaseError::Maxed(UpgradeKind::Pulse))
        );
        let pulse_offer = offers(&upgrades, &economy)
            .into_iter()
            .find(|offer| offer.kind == UpgradeKind::Pulse)
            .expect("pulse offer");
        assert_eq!(pulse_offer.cost, None);
        assert!(!pulse_offer.affordable);
    }

    #[test]
    fn index_maps_to_catalog_order() {
        assert_eq!(UpgradeKind::from_index(0), Some(UpgradeKind::Buffer));
        assert_eq!(UpgradeKind::from_index(2), Some(UpgradeKind::Pulse));
        assert_eq!(UpgradeKind::from_index(3), None);
    }
}
