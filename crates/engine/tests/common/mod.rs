#![allow(dead_code)]

use budget_engine::{
    BudgetConfig, BudgetParameterConfig, Category, DesignOption, DomainOfExpertise,
    ElementDefinition, ElementUsage, EnumerationValue, ExtraMassContributionConfiguration,
    MeasurementScale, Parameter, ParameterOverride, ParameterType, ParameterTypeKind,
    ProductTree, ProductTreeData, QuantityMarginSpec, SubSystemDefinition, ValueSet,
};
use uuid::Uuid;

/// Reference data plus a root element definition "Sat" that tests fill in.
pub struct Fixture {
    pub domain: Uuid,
    pub other_domain: Uuid,
    pub option_a: Uuid,
    pub option_b: Uuid,
    pub ss_cat: Uuid,
    pub eqt_cat: Uuid,
    pub cons_cat: Uuid,
    pub harness_cat: Uuid,
    pub mass: Uuid,
    pub margin: Uuid,
    pub number: Uuid,
    pub cost: Uuid,
    pub level: Uuid,
    pub kg: Uuid,
    pub g: Uuid,
    pub root: Uuid,
    pub data: ProductTreeData,
}

fn named<T>(make: impl FnOnce(Uuid, String, String) -> T, short_name: &str, name: &str) -> (Uuid, T) {
    let id = Uuid::new_v4();
    (id, make(id, short_name.to_string(), name.to_string()))
}

fn quantity(short_name: &str, scale: Option<Uuid>) -> (Uuid, ParameterType) {
    named(
        |id, short_name, name| ParameterType {
            id,
            short_name,
            name,
            kind: ParameterTypeKind::Quantity {
                default_scale: scale,
            },
        },
        short_name,
        short_name,
    )
}

impl Fixture {
    pub fn new() -> Self {
        let mut data = ProductTreeData::default();

        let (domain, d) = named(
            |id, short_name, name| DomainOfExpertise { id, short_name, name },
            "SYS",
            "System",
        );
        data.domains.push(d);
        let (other_domain, d) = named(
            |id, short_name, name| DomainOfExpertise { id, short_name, name },
            "PWR",
            "Power",
        );
        data.domains.push(d);

        let (option_a, o) = named(
            |id, short_name, name| DesignOption { id, short_name, name },
            "OPT_A",
            "Option A",
        );
        data.options.push(o);
        let (option_b, o) = named(
            |id, short_name, name| DesignOption { id, short_name, name },
            "OPT_B",
            "Option B",
        );
        data.options.push(o);

        let mut category = |short_name: &str| {
            let (id, c) = named(
                |id, short_name, name| Category { id, short_name, name },
                short_name,
                short_name,
            );
            data.categories.push(c);
            id
        };
        let ss_cat = category("ss");
        let eqt_cat = category("eqt");
        let cons_cat = category("cons");
        let harness_cat = category("harness");

        let (kg, s) = named(
            |id, short_name, name| MeasurementScale { id, short_name, name },
            "kg",
            "kilogram",
        );
        data.scales.push(s);
        let (g, s) = named(
            |id, short_name, name| MeasurementScale { id, short_name, name },
            "g",
            "gram",
        );
        data.scales.push(s);

        let (mass, p) = quantity("m", Some(kg));
        data.parameter_types.push(p);
        let (margin, p) = quantity("margin", None);
        data.parameter_types.push(p);
        let (number, p) = quantity("n_items", None);
        data.parameter_types.push(p);
        let (cost, p) = quantity("cost", None);
        data.parameter_types.push(p);
        let (level, p) = named(
            |id, short_name, name| ParameterType {
                id,
                short_name,
                name,
                kind: ParameterTypeKind::Enumeration {
                    values: vec![
                        EnumerationValue {
                            short_name: "SS".to_string(),
                            name: "sub-system".to_string(),
                        },
                        EnumerationValue {
                            short_name: "EQT".to_string(),
                            name: "equipment".to_string(),
                        },
                    ],
                },
            },
            "level",
            "system level",
        );
        data.parameter_types.push(p);

        let root = ElementDefinition::new("Sat", "Satellite");
        let root_id = root.id;
        data.element_definitions.push(root);

        Self {
            domain,
            other_domain,
            option_a,
            option_b,
            ss_cat,
            eqt_cat,
            cons_cat,
            harness_cat,
            mass,
            margin,
            number,
            cost,
            level,
            kg,
            g,
            root: root_id,
            data,
        }
    }

    fn definition_mut(&mut self, id: Uuid) -> &mut ElementDefinition {
        self.data
            .element_definitions
            .iter_mut()
            .find(|d| d.id == id)
            .unwrap()
    }

    fn usage_mut(&mut self, usage: Uuid) -> &mut ElementUsage {
        self.data
            .element_definitions
            .iter_mut()
            .flat_map(|d| d.contained_elements.iter_mut())
            .find(|u| u.id == usage)
            .unwrap()
    }

    pub fn add_definition(&mut self, short_name: &str) -> Uuid {
        let definition = ElementDefinition::new(short_name, short_name);
        let id = definition.id;
        self.data.element_definitions.push(definition);
        id
    }

    /// Adds a usage of `definition` into `parent` and returns the usage id.
    pub fn add_usage(
        &mut self,
        parent: Uuid,
        short_name: &str,
        definition: Uuid,
        categories: &[Uuid],
    ) -> Uuid {
        let mut usage = ElementUsage::new(short_name, short_name, definition);
        usage.categories = categories.to_vec();
        let id = usage.id;
        self.definition_mut(parent).contained_elements.push(usage);
        id
    }

    fn parameter_mut(&mut self, definition: Uuid, parameter_type: Uuid) -> &mut Parameter {
        let owner = self.domain;
        let scale = (parameter_type == self.mass).then_some(self.kg);
        let definition = self.definition_mut(definition);
        if let Some(index) = definition
            .parameters
            .iter()
            .position(|p| p.parameter_type == parameter_type)
        {
            return &mut definition.parameters[index];
        }
        definition.parameters.push(Parameter {
            parameter_type,
            owner,
            scale,
            is_option_dependent: false,
            value_sets: Vec::new(),
            subscriptions: Vec::new(),
        });
        let last = definition.parameters.len() - 1;
        &mut definition.parameters[last]
    }

    /// Sets an option independent value on a definition.
    pub fn set_value(&mut self, definition: Uuid, parameter_type: Uuid, value: &str) {
        let parameter = self.parameter_mut(definition, parameter_type);
        parameter.is_option_dependent = false;
        parameter.value_sets = vec![ValueSet::manual(None, value)];
    }

    /// Sets one value per option on a definition.
    pub fn set_option_values(
        &mut self,
        definition: Uuid,
        parameter_type: Uuid,
        values: &[(Uuid, &str)],
    ) {
        let parameter = self.parameter_mut(definition, parameter_type);
        parameter.is_option_dependent = true;
        parameter.value_sets = values
            .iter()
            .map(|(option, value)| ValueSet::manual(Some(*option), *value))
            .collect();
    }

    pub fn set_scale(&mut self, definition: Uuid, parameter_type: Uuid, scale: Option<Uuid>) {
        self.parameter_mut(definition, parameter_type).scale = scale;
    }

    /// Overrides a definition parameter on one usage, one value per option or
    /// a single option-less value.
    pub fn override_values(
        &mut self,
        usage: Uuid,
        parameter_type: Uuid,
        values: &[(Option<Uuid>, &str)],
    ) {
        let owner = self.domain;
        let usage = self.usage_mut(usage);
        usage.parameter_overrides.push(ParameterOverride {
            parameter_type,
            owner,
            value_sets: values
                .iter()
                .map(|(option, value)| ValueSet::manual(*option, *value))
                .collect(),
            subscriptions: Vec::new(),
        });
    }

    pub fn exclude(&mut self, usage: Uuid, option: Uuid) {
        self.usage_mut(usage).excluded_options.push(option);
    }

    pub fn tree(&self) -> ProductTree {
        ProductTree::new(self.data.clone()).unwrap()
    }

    pub fn sub_system_definition(&self) -> SubSystemDefinition {
        SubSystemDefinition::new(vec![self.ss_cat], vec![self.eqt_cat])
    }

    pub fn mass_config(&self) -> BudgetConfig {
        let mut config = BudgetConfig::new(
            vec![self.root],
            vec![self.sub_system_definition()],
            BudgetParameterConfig::Mass {
                dry_mass: QuantityMarginSpec::new(self.mass, Some(self.margin)),
                extra_contributions: vec![ExtraMassContributionConfiguration {
                    categories: vec![self.cons_cat],
                    mass_parameter_type: self.mass,
                    margin_parameter_type: Some(self.margin),
                }],
            },
        );
        config.number_of_element = Some(self.number);
        config
    }
}

/// The satellite used by most tests.
///
/// `Sat` contains the sub-system `ss`, two equipment `eqt1`/`eqt2` (the
/// second one excluded from option B) and a consumable `cons`.
///
/// | usage | mass A | mass B | margin | items |
/// |-------|--------|--------|--------|-------|
/// | ss    | 2000   | 3000   | 20     |       |
/// | eqt1  | 1000   | 2000   | 25     | 2     |
/// | eqt2  | 500    | -      | 25     | 2     |
/// | cons  | 200    | 200    | 100    |       |
pub struct Satellite {
    pub fixture: Fixture,
    pub ss: Uuid,
    pub eqt1: Uuid,
    pub eqt2: Uuid,
    pub cons: Uuid,
}

pub fn satellite() -> Satellite {
    let mut f = Fixture::new();
    let root = f.root;

    let ss_ed = f.add_definition("SS");
    let eqt_ed = f.add_definition("EQT");
    let cons_ed = f.add_definition("Cons");

    f.set_option_values(ss_ed, f.mass, &[(f.option_a, "2000"), (f.option_b, "3000")]);
    f.set_value(ss_ed, f.margin, "20");

    f.set_option_values(eqt_ed, f.mass, &[(f.option_a, "500"), (f.option_b, "100")]);
    f.set_value(eqt_ed, f.margin, "25");
    f.set_value(eqt_ed, f.number, "2");

    f.set_value(cons_ed, f.mass, "200");
    f.set_value(cons_ed, f.margin, "100");

    let (ss_cat, eqt_cat, cons_cat) = (f.ss_cat, f.eqt_cat, f.cons_cat);
    let ss = f.add_usage(root, "ss", ss_ed, &[ss_cat]);
    let eqt1 = f.add_usage(root, "eqt1", eqt_ed, &[eqt_cat]);
    let eqt2 = f.add_usage(root, "eqt2", eqt_ed, &[eqt_cat]);
    let cons = f.add_usage(root, "cons", cons_ed, &[cons_cat]);

    let (option_a, option_b, mass) = (f.option_a, f.option_b, f.mass);
    f.override_values(eqt1, mass, &[(Some(option_a), "1000"), (Some(option_b), "2000")]);
    f.exclude(eqt2, option_b);

    Satellite {
        fixture: f,
        ss,
        eqt1,
        eqt2,
        cons,
    }
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
