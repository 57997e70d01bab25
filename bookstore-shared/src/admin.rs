//! Admin registration for the catalog models.
//!
//! Each model declares which columns the admin list view shows, which fields
//! the admin search box matches (case-insensitive substring), and which
//! many-to-many relations are edited with a multi-select widget. The admin
//! renderer itself lives outside this workspace and only consumes these
//! declarations.

use serde::Serialize;

use crate::identity::EntityKind;

/// Widget an admin form uses for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldWidget {
    Text,
    TextArea,
    Email,
    Url,
    Number,
    Decimal,
    Date,
    Select,
    Image,
    ForeignKey,
    MultiSelect,
}

/// One row of a model's admin schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminField {
    pub name: &'static str,
    pub widget: FieldWidget,
    pub searchable: bool,
    pub listed: bool,
}

/// Admin declaration for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelAdmin {
    pub kind: EntityKind,
    pub list_display: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub filter_horizontal: &'static [&'static str],
    form_fields: &'static [(&'static str, FieldWidget)],
}

pub const BOOK_ADMIN: ModelAdmin = ModelAdmin {
    kind: EntityKind::Book,
    list_display: &["title", "isbn", "price", "publication_date"],
    search_fields: &["title"],
    filter_horizontal: &["authors", "tags"],
    form_fields: &[
        ("title", FieldWidget::Text),
        ("description", FieldWidget::TextArea),
        ("summary", FieldWidget::TextArea),
        ("authors", FieldWidget::MultiSelect),
        ("publisher", FieldWidget::ForeignKey),
        ("publication_date", FieldWidget::Date),
        ("state", FieldWidget::Select),
        ("isbn", FieldWidget::Text),
        ("price", FieldWidget::Decimal),
        ("pages", FieldWidget::Number),
        ("stock_count", FieldWidget::Number),
        ("tags", FieldWidget::MultiSelect),
    ],
};

pub const AUTHOR_ADMIN: ModelAdmin = ModelAdmin {
    kind: EntityKind::Author,
    list_display: &["name", "email"],
    search_fields: &["name"],
    filter_horizontal: &[],
    form_fields: &[
        ("salutation", FieldWidget::Text),
        ("name", FieldWidget::Text),
        ("email", FieldWidget::Email),
        ("avatar", FieldWidget::Image),
    ],
};

pub const PUBLISHER_ADMIN: ModelAdmin = ModelAdmin {
    kind: EntityKind::Publisher,
    list_display: &["name"],
    search_fields: &["name"],
    filter_horizontal: &[],
    form_fields: &[
        ("name", FieldWidget::Text),
        ("address", FieldWidget::Text),
        ("city", FieldWidget::Text),
        ("state_province", FieldWidget::Text),
        ("country", FieldWidget::Text),
        ("website", FieldWidget::Url),
        ("latitude", FieldWidget::Decimal),
        ("longitude", FieldWidget::Decimal),
    ],
};

pub const TAG_ADMIN: ModelAdmin = ModelAdmin {
    kind: EntityKind::Tag,
    list_display: &["title"],
    search_fields: &["title"],
    filter_horizontal: &[],
    form_fields: &[("title", FieldWidget::Text)],
};

/// Every registered model, in the order the admin index lists them.
pub fn registry() -> [ModelAdmin; 4] {
    [BOOK_ADMIN, AUTHOR_ADMIN, PUBLISHER_ADMIN, TAG_ADMIN]
}

/// Look up the admin declaration for an entity kind.
pub fn for_kind(kind: EntityKind) -> ModelAdmin {
    match kind {
        EntityKind::Book => BOOK_ADMIN,
        EntityKind::Author => AUTHOR_ADMIN,
        EntityKind::Publisher => PUBLISHER_ADMIN,
        EntityKind::Tag => TAG_ADMIN,
    }
}

impl ModelAdmin {
    /// The model's form fields with their list and search flags resolved.
    pub fn fields(&self) -> Vec<AdminField> {
        self.form_fields
            .iter()
            .map(|&(name, widget)| AdminField {
                name,
                widget,
                searchable: self.search_fields.contains(&name),
                listed: self.list_display.contains(&name),
            })
            .collect()
    }
}
