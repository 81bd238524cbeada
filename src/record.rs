//! Component record schema: stored fields, display columns and record values.

use chrono::NaiveDateTime;
use std::fmt::Display;

/// Stored attribute of a component record, in table order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Client,
    Description,
    Building,
    Unit,
    Area,
    Tag,
    Drawing,
    Floor,
    ComponentType,
    SubType,
    Regulation,
    ChemicalState,
    Dtm,
    Utm,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::Client,
        Field::Description,
        Field::Building,
        Field::Unit,
        Field::Area,
        Field::Tag,
        Field::Drawing,
        Field::Floor,
        Field::ComponentType,
        Field::SubType,
        Field::Regulation,
        Field::ChemicalState,
        Field::Dtm,
        Field::Utm,
    ];

    /// Column name in the store, also the manual entry key.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Client => "client",
            Field::Description => "description",
            Field::Building => "building",
            Field::Unit => "unit",
            Field::Area => "area",
            Field::Tag => "tag",
            Field::Drawing => "drawing",
            Field::Floor => "floor",
            Field::ComponentType => "component_type",
            Field::SubType => "sub_type",
            Field::Regulation => "regulation",
            Field::ChemicalState => "chemical_state",
            Field::Dtm => "dtm",
            Field::Utm => "utm",
        }
    }

    /// Spreadsheet header the field is imported from. Matched exactly.
    pub fn header(&self) -> &'static str {
        match self {
            Field::Client => "Client",
            Field::Description => "Description",
            Field::Building => "Building",
            Field::Unit => "Unit",
            Field::Area => "Area",
            Field::Tag => "Tag",
            Field::Drawing => "Drawing",
            Field::Floor => "Floor",
            Field::ComponentType => "Component Type",
            Field::SubType => "Sub Type",
            Field::Regulation => "Regulation",
            Field::ChemicalState => "Chemical State",
            Field::Dtm => "DTM",
            Field::Utm => "UTM",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Displayed table column, in display order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Drawing,
    Building,
    Unit,
    Area,
    Tag,
    Component,
    SubType,
    Floor,
    Regulation,
    Chemical,
    Description,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Drawing,
        Column::Building,
        Column::Unit,
        Column::Area,
        Column::Tag,
        Column::Component,
        Column::SubType,
        Column::Floor,
        Column::Regulation,
        Column::Chemical,
        Column::Description,
    ];

    /// Position of the cell within a rendered row.
    pub fn index(&self) -> usize {
        match self {
            Column::Drawing => 0,
            Column::Building => 1,
            Column::Unit => 2,
            Column::Area => 3,
            Column::Tag => 4,
            Column::Component => 5,
            Column::SubType => 6,
            Column::Floor => 7,
            Column::Regulation => 8,
            Column::Chemical => 9,
            Column::Description => 10,
        }
    }

    /// Identifier used by the search column selector.
    pub fn key(&self) -> &'static str {
        match self {
            Column::Drawing => "drawing",
            Column::Building => "building",
            Column::Unit => "unit",
            Column::Area => "area",
            Column::Tag => "tag",
            Column::Component => "component",
            Column::SubType => "subtype",
            Column::Floor => "floor",
            Column::Regulation => "regulation",
            Column::Chemical => "chemical",
            Column::Description => "description",
        }
    }

    pub fn from_key(key: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|column| column.key() == key)
    }

    pub fn field(&self) -> Field {
        match self {
            Column::Drawing => Field::Drawing,
            Column::Building => Field::Building,
            Column::Unit => Field::Unit,
            Column::Area => Field::Area,
            Column::Tag => Field::Tag,
            Column::Component => Field::ComponentType,
            Column::SubType => Field::SubType,
            Column::Floor => Field::Floor,
            Column::Regulation => Field::Regulation,
            Column::Chemical => Field::ChemicalState,
            Column::Description => Field::Description,
        }
    }

    /// Table heading shown by the renderer.
    pub fn title(&self) -> &'static str {
        match self {
            Column::Component => "Component Type",
            Column::Chemical => "Chemical State",
            column => column.field().header(),
        }
    }
}

/// Normalized record waiting to be inserted. Absent text fields are empty strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewRecord {
    pub client: String,
    pub description: String,
    pub building: String,
    pub unit: String,
    pub area: String,
    pub tag: String,
    pub drawing: String,
    pub floor: Option<f64>,
    pub component_type: String,
    pub sub_type: String,
    pub regulation: String,
    pub chemical_state: String,
    pub dtm: String,
    pub utm: String,
}

impl NewRecord {
    /// Text value of `field`; the floor is rendered as its number, or blank.
    pub fn text(&self, field: Field) -> String {
        match field {
            Field::Client => self.client.to_owned(),
            Field::Description => self.description.to_owned(),
            Field::Building => self.building.to_owned(),
            Field::Unit => self.unit.to_owned(),
            Field::Area => self.area.to_owned(),
            Field::Tag => self.tag.to_owned(),
            Field::Drawing => self.drawing.to_owned(),
            Field::Floor => self.floor.map(|floor| floor.to_string()).unwrap_or_default(),
            Field::ComponentType => self.component_type.to_owned(),
            Field::SubType => self.sub_type.to_owned(),
            Field::Regulation => self.regulation.to_owned(),
            Field::ChemicalState => self.chemical_state.to_owned(),
            Field::Dtm => self.dtm.to_owned(),
            Field::Utm => self.utm.to_owned(),
        }
    }

    /// Sets a text field. `Field::Floor` is ignored; use the `floor` member.
    pub fn set_text(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Client => &mut self.client,
            Field::Description => &mut self.description,
            Field::Building => &mut self.building,
            Field::Unit => &mut self.unit,
            Field::Area => &mut self.area,
            Field::Tag => &mut self.tag,
            Field::Drawing => &mut self.drawing,
            Field::Floor => return,
            Field::ComponentType => &mut self.component_type,
            Field::SubType => &mut self.sub_type,
            Field::Regulation => &mut self.regulation,
            Field::ChemicalState => &mut self.chemical_state,
            Field::Dtm => &mut self.dtm,
            Field::Utm => &mut self.utm,
        };
        *slot = value;
    }
}

/// Stored component record.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentRecord {
    /// Identity assigned by the store, increasing in insertion order
    pub id: i64,
    pub values: NewRecord,
    pub created_at: NaiveDateTime,
}

impl ComponentRecord {
    /// Plain text of the eleven display cells, in column order.
    pub fn cells(&self) -> Vec<String> {
        Column::ALL
            .iter()
            .map(|column| self.values.text(column.field()))
            .collect()
    }
}
