//! The closed table of element kinds.

use super::pin::{PinDirection, PinSpec};
use crate::format::ExperimentType;
use crate::grid::Footprint;
use crate::position::Rotation;
use serde_json::{Map, Value, json};

/// Property key of the lock flag every circuit element carries.
pub const LOCK_PROPERTY: &str = "锁定";
/// Property key of the logic high voltage.
pub const HIGH_LEVEL_PROPERTY: &str = "高电平";
/// Property key of the logic low voltage.
pub const LOW_LEVEL_PROPERTY: &str = "低电平";
/// Property key of a switch state.
pub const SWITCH_PROPERTY: &str = "开关";
/// Property key of the decimal value shown by 8-bit parts.
pub const DECIMAL_PROPERTY: &str = "十进制";

/// Every element model the library knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    LogicInput,
    LogicOutput,
    YesGate,
    NoGate,
    OrGate,
    AndGate,
    NorGate,
    NandGate,
    XorGate,
    XnorGate,
    ImpGate,
    NimpGate,
    HalfAdder,
    FullAdder,
    Multiplier,
    DFlipflop,
    TFlipflop,
    RealTFlipflop,
    JkFlipflop,
    Counter,
    RandomGenerator,
    EightBitInput,
    EightBitDisplay,
    SchmittTrigger,
    SimpleSwitch,
    SpdtSwitch,
    PushSwitch,
    BatterySource,
    Resistor,
    NegativeCharge,
    PositiveCharge,
}

const fn input(name: &'static str, index: u32) -> PinSpec {
    PinSpec { name, index, direction: PinDirection::Input }
}

const fn output(name: &'static str, index: u32) -> PinSpec {
    PinSpec { name, index, direction: PinDirection::Output }
}

const fn terminal(name: &'static str, index: u32) -> PinSpec {
    PinSpec { name, index, direction: PinDirection::Passive }
}

const LOGIC_INPUT_PINS: &[PinSpec] = &[output("o", 0)];
const LOGIC_OUTPUT_PINS: &[PinSpec] = &[input("i", 0)];
const TWO_PIN_GATE_PINS: &[PinSpec] = &[input("i", 0), output("o", 1)];
const THREE_PIN_GATE_PINS: &[PinSpec] = &[input("i_up", 0), input("i_low", 1), output("o", 2)];
const TWO_IN_TWO_OUT_PINS: &[PinSpec] = &[
    input("i_up", 2),
    input("i_low", 3),
    output("o_up", 0),
    output("o_low", 1),
];
const THREE_IN_TWO_OUT_PINS: &[PinSpec] = &[
    input("i_up", 2),
    input("i_mid", 3),
    input("i_low", 4),
    output("o_up", 0),
    output("o_low", 1),
];
const MULTIPLIER_PINS: &[PinSpec] = &[
    input("i_up", 4),
    input("i_upmid", 5),
    input("i_lowmid", 6),
    input("i_low", 7),
    output("o_up", 0),
    output("o_upmid", 1),
    output("o_lowmid", 2),
    output("o_low", 3),
];
const COUNTER_PINS: &[PinSpec] = &[
    input("i_up", 4),
    input("i_low", 5),
    output("o_up", 0),
    output("o_upmid", 1),
    output("o_lowmid", 2),
    output("o_low", 3),
];
const EIGHT_BIT_PINS: &[PinSpec] = &[
    input("i_up", 0),
    input("i_upmid", 1),
    input("i_lowmid", 2),
    input("i_low", 3),
    output("o_up", 4),
    output("o_upmid", 5),
    output("o_lowmid", 6),
    output("o_low", 7),
];
const TWO_TERMINAL_PINS: &[PinSpec] = &[terminal("l", 0), terminal("r", 1)];
const SPDT_PINS: &[PinSpec] = &[terminal("l", 0), terminal("mid", 1), terminal("r", 2)];
const NO_PINS: &[PinSpec] = &[];

impl ElementKind {
    /// All kinds, in table order.
    pub const ALL: &'static [ElementKind] = &[
        ElementKind::LogicInput,
        ElementKind::LogicOutput,
        ElementKind::YesGate,
        ElementKind::NoGate,
        ElementKind::OrGate,
        ElementKind::AndGate,
        ElementKind::NorGate,
        ElementKind::NandGate,
        ElementKind::XorGate,
        ElementKind::XnorGate,
        ElementKind::ImpGate,
        ElementKind::NimpGate,
        ElementKind::HalfAdder,
        ElementKind::FullAdder,
        ElementKind::Multiplier,
        ElementKind::DFlipflop,
        ElementKind::TFlipflop,
        ElementKind::RealTFlipflop,
        ElementKind::JkFlipflop,
        ElementKind::Counter,
        ElementKind::RandomGenerator,
        ElementKind::EightBitInput,
        ElementKind::EightBitDisplay,
        ElementKind::SchmittTrigger,
        ElementKind::SimpleSwitch,
        ElementKind::SpdtSwitch,
        ElementKind::PushSwitch,
        ElementKind::BatterySource,
        ElementKind::Resistor,
        ElementKind::NegativeCharge,
        ElementKind::PositiveCharge,
    ];

    /// The `ModelID` tag stored in save files.
    pub fn model_id(self) -> &'static str {
        match self {
            ElementKind::LogicInput => "Logic Input",
            ElementKind::LogicOutput => "Logic Output",
            ElementKind::YesGate => "Yes Gate",
            ElementKind::NoGate => "No Gate",
            ElementKind::OrGate => "Or Gate",
            ElementKind::AndGate => "And Gate",
            ElementKind::NorGate => "Nor Gate",
            ElementKind::NandGate => "Nand Gate",
            ElementKind::XorGate => "Xor Gate",
            ElementKind::XnorGate => "Xnor Gate",
            ElementKind::ImpGate => "Imp Gate",
            ElementKind::NimpGate => "Nimp Gate",
            ElementKind::HalfAdder => "Half Adder",
            ElementKind::FullAdder => "Full Adder",
            ElementKind::Multiplier => "Multiplier",
            ElementKind::DFlipflop => "D Flipflop",
            ElementKind::TFlipflop => "T Flipflop",
            ElementKind::RealTFlipflop => "Real-T Flipflop",
            ElementKind::JkFlipflop => "JK Flipflop",
            ElementKind::Counter => "Counter",
            ElementKind::RandomGenerator => "Random Generator",
            ElementKind::EightBitInput => "8bit Input",
            ElementKind::EightBitDisplay => "8bit Display",
            ElementKind::SchmittTrigger => "Schmitt Trigger",
            ElementKind::SimpleSwitch => "Simple Switch",
            ElementKind::SpdtSwitch => "SPDT Switch",
            ElementKind::PushSwitch => "Push Switch",
            ElementKind::BatterySource => "Battery Source",
            ElementKind::Resistor => "Resistor",
            ElementKind::NegativeCharge => "Negative Charge",
            ElementKind::PositiveCharge => "Positive Charge",
        }
    }

    /// Look a kind up by its stored `ModelID`.
    pub fn from_model_id(model_id: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.model_id() == model_id)
    }

    /// The experiment type this kind can be placed in.
    pub fn experiment_type(self) -> ExperimentType {
        match self {
            ElementKind::NegativeCharge | ElementKind::PositiveCharge => {
                ExperimentType::Electromagnetism
            }
            _ => ExperimentType::Circuit,
        }
    }

    pub fn footprint(self) -> Footprint {
        match self {
            ElementKind::HalfAdder
            | ElementKind::FullAdder
            | ElementKind::Multiplier
            | ElementKind::DFlipflop
            | ElementKind::TFlipflop
            | ElementKind::RealTFlipflop
            | ElementKind::JkFlipflop
            | ElementKind::Counter
            | ElementKind::RandomGenerator
            | ElementKind::EightBitInput
            | ElementKind::EightBitDisplay => Footprint::Big,
            _ => Footprint::Small,
        }
    }

    /// The fixed pin table of this kind.
    pub fn pins(self) -> &'static [PinSpec] {
        match self {
            ElementKind::LogicInput => LOGIC_INPUT_PINS,
            ElementKind::LogicOutput => LOGIC_OUTPUT_PINS,
            ElementKind::YesGate | ElementKind::NoGate | ElementKind::SchmittTrigger => {
                TWO_PIN_GATE_PINS
            }
            ElementKind::OrGate
            | ElementKind::AndGate
            | ElementKind::NorGate
            | ElementKind::NandGate
            | ElementKind::XorGate
            | ElementKind::XnorGate
            | ElementKind::ImpGate
            | ElementKind::NimpGate => THREE_PIN_GATE_PINS,
            ElementKind::HalfAdder
            | ElementKind::DFlipflop
            | ElementKind::TFlipflop
            | ElementKind::RealTFlipflop => TWO_IN_TWO_OUT_PINS,
            ElementKind::FullAdder | ElementKind::JkFlipflop => THREE_IN_TWO_OUT_PINS,
            ElementKind::Multiplier => MULTIPLIER_PINS,
            ElementKind::Counter | ElementKind::RandomGenerator => COUNTER_PINS,
            ElementKind::EightBitInput | ElementKind::EightBitDisplay => EIGHT_BIT_PINS,
            ElementKind::SimpleSwitch
            | ElementKind::PushSwitch
            | ElementKind::BatterySource
            | ElementKind::Resistor => TWO_TERMINAL_PINS,
            ElementKind::SpdtSwitch => SPDT_PINS,
            ElementKind::NegativeCharge | ElementKind::PositiveCharge => NO_PINS,
        }
    }

    /// Whether `index` names a pin of this kind.
    pub fn has_pin(self, index: u32) -> bool {
        self.pins().iter().any(|pin| pin.index == index)
    }

    /// Look a pin up by name.
    pub fn pin(self, name: &str) -> Option<&'static PinSpec> {
        self.pins().iter().find(|pin| pin.name == name)
    }

    /// Whether this kind is a logic part with high/low level properties.
    pub fn is_logic(self) -> bool {
        self.experiment_type() == ExperimentType::Circuit
            && !matches!(
                self,
                ElementKind::SchmittTrigger
                    | ElementKind::SimpleSwitch
                    | ElementKind::SpdtSwitch
                    | ElementKind::PushSwitch
                    | ElementKind::BatterySource
                    | ElementKind::Resistor
            )
    }

    pub fn default_rotation(self) -> Rotation {
        match self.experiment_type() {
            ExperimentType::Circuit => Rotation::new(0.0, 0.0, 180.0),
            _ => Rotation::default(),
        }
    }

    /// Properties a freshly placed element starts with.
    pub fn default_properties(self) -> Vec<(&'static str, f64)> {
        let logic = vec![(HIGH_LEVEL_PROPERTY, 3.0), (LOW_LEVEL_PROPERTY, 0.0), (LOCK_PROPERTY, 1.0)];
        match self {
            ElementKind::LogicInput => {
                let mut props = logic;
                props.push((SWITCH_PROPERTY, 0.0));
                props
            }
            ElementKind::LogicOutput | ElementKind::EightBitDisplay => {
                let mut props = logic;
                props.push(("状态", 0.0));
                props
            }
            ElementKind::YesGate
            | ElementKind::NoGate
            | ElementKind::OrGate
            | ElementKind::AndGate
            | ElementKind::NorGate
            | ElementKind::NandGate
            | ElementKind::XorGate
            | ElementKind::XnorGate
            | ElementKind::ImpGate
            | ElementKind::NimpGate => {
                let mut props = logic;
                props.push(("最大电流", 0.1));
                props
            }
            ElementKind::EightBitInput => {
                let mut props = logic;
                props.push((DECIMAL_PROPERTY, 0.0));
                props
            }
            ElementKind::HalfAdder
            | ElementKind::FullAdder
            | ElementKind::Multiplier
            | ElementKind::DFlipflop
            | ElementKind::TFlipflop
            | ElementKind::RealTFlipflop
            | ElementKind::JkFlipflop
            | ElementKind::Counter
            | ElementKind::RandomGenerator => logic,
            ElementKind::SchmittTrigger => vec![
                ("工作模式", 0.0),
                ("切变速率", 0.5),
                ("高电准位", 5.0),
                (LOCK_PROPERTY, 1.0),
                ("正向阈值", 3.33333334),
                ("低电准位", 0.0),
                ("负向阈值", 1.66666666),
            ],
            ElementKind::SimpleSwitch | ElementKind::SpdtSwitch => {
                vec![(SWITCH_PROPERTY, 0.0), (LOCK_PROPERTY, 1.0)]
            }
            ElementKind::PushSwitch => vec![
                (SWITCH_PROPERTY, 0.0),
                ("默认开关", 0.0),
                (LOCK_PROPERTY, 1.0),
            ],
            ElementKind::BatterySource => vec![
                ("最大功率", 16.2),
                ("电压", 3.0),
                ("内阻", 0.5),
                (LOCK_PROPERTY, 1.0),
            ],
            ElementKind::Resistor => vec![
                ("最大电阻", 1_000_000.0),
                ("最小电阻", 0.1),
                ("电阻", 10.0),
                (LOCK_PROPERTY, 1.0),
            ],
            ElementKind::NegativeCharge => vec![
                (LOCK_PROPERTY, 1.0),
                ("强度", -1e-7),
                ("质量", 0.1),
            ],
            ElementKind::PositiveCharge => vec![
                (LOCK_PROPERTY, 1.0),
                ("强度", 1e-7),
                ("质量", 0.1),
            ],
        }
    }

    /// Record fields outside the modeled set that a fresh element is saved with.
    pub fn default_extras(self) -> Map<String, Value> {
        let extras = match self.experiment_type() {
            ExperimentType::Electromagnetism => json!({
                "Velocity": "0,0,0",
                "AngularVelocity": "0,0,0",
            }),
            _ => json!({
                "IsBroken": false,
                "IsLocked": false,
                "Statistics": self.default_statistics(),
                "DiagramCached": false,
                "DiagramPosition": {"X": 0, "Y": 0, "Magnitude": 0.0},
                "DiagramRotation": 0,
            }),
        };
        match extras {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn default_statistics(self) -> Value {
        match self {
            ElementKind::LogicInput | ElementKind::BatterySource => {
                json!({"电流": 0.0, "电压": 0.0, "功率": 0.0})
            }
            ElementKind::EightBitDisplay => json!({
                "7": 0.0, "6": 0.0, "5": 0.0, "4": 0.0,
                "3": 0.0, "2": 0.0, "1": 0.0, "0": 0.0, "十进制": 0.0,
            }),
            ElementKind::SchmittTrigger => json!({"输入电压": 0.0, "输出电压": 0.0, "1": 0.0}),
            ElementKind::Resistor => json!({
                "瞬间功率": 0.0, "瞬间电流": 0.0, "瞬间电压": 0.0,
                "功率": 0.0, "电压": 0.0, "电流": 0.0,
            }),
            _ => json!({}),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_model_ids_are_unique_and_resolvable() {
        let mut seen = HashSet::new();
        for &kind in ElementKind::ALL {
            assert!(seen.insert(kind.model_id()), "duplicate {}", kind.model_id());
            assert_eq!(ElementKind::from_model_id(kind.model_id()), Some(kind));
        }
        assert_eq!(ElementKind::from_model_id("Flux Capacitor"), None);
    }

    #[test]
    fn test_pin_indices_are_unique_per_kind() {
        for &kind in ElementKind::ALL {
            let mut indices = HashSet::new();
            for pin in kind.pins() {
                assert!(indices.insert(pin.index), "{} repeats pin {}", kind.model_id(), pin.index);
            }
        }
    }

    #[test]
    fn test_full_adder_pins() {
        let kind = ElementKind::FullAdder;
        assert_eq!(kind.footprint(), Footprint::Big);
        let inputs: Vec<u32> = kind
            .pins()
            .iter()
            .filter(|p| p.direction == PinDirection::Input)
            .map(|p| p.index)
            .collect();
        assert_eq!(inputs, vec![2, 3, 4]);
        assert_eq!(kind.pin("o_low").map(|p| p.index), Some(1));
        assert!(!kind.has_pin(5));
    }

    #[test]
    fn test_every_circuit_kind_is_lockable() {
        for &kind in ElementKind::ALL {
            assert!(
                kind.default_properties().iter().any(|(k, _)| *k == LOCK_PROPERTY),
                "{} lacks a lock property",
                kind.model_id()
            );
        }
    }

    #[test]
    fn test_default_extras_by_type() {
        assert!(ElementKind::AndGate.default_extras().contains_key("Statistics"));
        assert!(ElementKind::PositiveCharge.default_extras().contains_key("Velocity"));
    }
}
