//! Plugin Migration Tests
//!
//! Upgrades a scene from marker@1.0.0 to marker@1.1.0 through in-memory
//! loaders built from the fixture manifests.

use plugin_schemas::dataset::DatasetField;
use plugin_schemas::id::{
    DatasetFieldId, DatasetId, DatasetSchemaId, ExtensionId, FieldId, InfoboxFieldId, ItemId,
    LayerId, PropertyId, SceneId, SchemaGroupId, WidgetId,
};
use plugin_schemas::layer::{Infobox, InfoboxField, Layer};
use plugin_schemas::property::{
    Link, Links, PropertyField, PropertyGroup, PropertyGroupList, PropertyItem,
};
use plugin_schemas::scene::SceneWidget;
use plugin_schemas::schema::SchemaFieldPointer;
use plugin_schemas::value::{LatLng, Payload};
use plugin_schemas::{
    ConvertOptions, Dataset, Manifest, MigratePluginsResult, Plugin, PluginError, PluginId,
    PluginMigrator, Property, Result, Scene, Schema, SchemaId, Type,
};
use serde_json::json;

const MARKER_V1: &str = include_str!("fixtures/marker_1.0.0.json");
const MARKER_V1_1: &str = include_str!("fixtures/marker_1.1.0.json");

// =============================================================================
// Fixtures
// =============================================================================

fn pid(s: &str) -> PluginId {
    PluginId::parse(s).unwrap()
}

fn ext(s: &str) -> ExtensionId {
    ExtensionId::new(s).unwrap()
}

fn group_id(s: &str) -> SchemaGroupId {
    SchemaGroupId::new(s).unwrap()
}

fn field(id: &str, t: Type, p: impl Into<Payload>) -> PropertyField {
    let v = t.value_from(&p.into(), None).unwrap().some();
    PropertyField::new(FieldId::new(id).unwrap(), v)
}

fn link(dataset: &str, field: &str) -> Option<Links> {
    Links::new(vec![Link::new(
        Some(DatasetId::from(dataset)),
        DatasetSchemaId::from("places"),
        DatasetFieldId::from(field),
    )])
}

fn group(item: &str, schema_group: &str, fields: Vec<PropertyField>) -> PropertyItem {
    PropertyItem::Group(PropertyGroup::new(
        ItemId::from(item),
        group_id(schema_group),
        fields,
    ))
}

fn property(id: &str, schema: &str, items: Vec<PropertyItem>) -> Property {
    Property::new(
        PropertyId::from(id),
        SceneId::from("s1"),
        SchemaId::parse(schema).unwrap(),
        items,
    )
    .unwrap()
}

struct Store {
    manifests: Vec<Manifest>,
    properties: Vec<Property>,
    layers: Vec<Layer>,
    datasets: Vec<Dataset>,
}

impl Store {
    fn new() -> Self {
        let opts = ConvertOptions::default();
        let manifests = vec![
            Manifest::from_json(MARKER_V1, &[], &opts).unwrap(),
            Manifest::from_json(MARKER_V1_1, &[], &opts).unwrap(),
        ];

        let properties = vec![
            property(
                "plugin-prop",
                "marker@1.0.0/@",
                vec![group("pg", "default", vec![field("size", Type::NUMBER, 10.0)])],
            ),
            property(
                "legend-prop",
                "marker@1.0.0/legend",
                vec![PropertyItem::GroupList(PropertyGroupList::new(
                    ItemId::from("items"),
                    group_id("items"),
                    vec![PropertyGroup::new(
                        ItemId::from("item-1"),
                        group_id("items"),
                        vec![field("text", Type::STRING, "first")],
                    )],
                ))],
            ),
            property(
                "pin-prop",
                "marker@1.0.0/pin",
                vec![
                    group(
                        "basic",
                        "default",
                        vec![
                            field("location", Type::LATLNG, LatLng::new(35.0, 139.0))
                                .with_links(link("d1", "pos")),
                            field("height", Type::NUMBER, 12.5),
                            field("label", Type::STRING, "Tokyo").with_links(link("d1", "count")),
                        ],
                    ),
                    group("style", "style", vec![field("shape", Type::STRING, "image")]),
                ],
            ),
        ];

        let old = pid("marker@1.0.0");
        let layers = vec![
            Layer::new(LayerId::from("l1"), SceneId::from("s1"), "Pins")
                .with_extension(old.clone(), ext("pin"))
                .with_property(PropertyId::from("pin-prop"))
                .with_infobox(
                    Infobox::new(
                        PropertyId::from("infobox-prop"),
                        vec![
                            InfoboxField::new(
                                InfoboxFieldId::from("f1"),
                                old.clone(),
                                ext("banner"),
                                PropertyId::from("banner-field-prop"),
                            ),
                            InfoboxField::new(
                                InfoboxFieldId::from("f2"),
                                pid("other@1.0.0"),
                                ext("text"),
                                PropertyId::from("text-field-prop"),
                            ),
                        ],
                    )
                    .unwrap(),
                ),
            Layer::new(LayerId::from("l2"), SceneId::from("s1"), "Banner")
                .with_extension(old, ext("banner"))
                .with_property(PropertyId::from("banner-layer-prop")),
            Layer::new(LayerId::from("l3"), SceneId::from("s1"), "Other")
                .with_extension(pid("other@1.0.0"), ext("text")),
        ];

        let datasets = vec![Dataset::new(
            DatasetId::from("d1"),
            DatasetSchemaId::from("places"),
            vec![
                DatasetField::new(
                    DatasetFieldId::from("pos"),
                    Type::LATLNG
                        .value_from(&LatLng::new(1.0, 2.0).into(), None)
                        .unwrap()
                        .some(),
                ),
                DatasetField::new(
                    DatasetFieldId::from("count"),
                    Type::NUMBER.value_from(&3.0.into(), None).unwrap().some(),
                ),
            ],
        )
        .unwrap()];

        Self {
            manifests,
            properties,
            layers,
            datasets,
        }
    }

    fn load_plugins(&self, ids: &[PluginId]) -> Result<Vec<Plugin>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.manifests.iter().find(|m| m.plugin.id() == id))
            .map(|m| m.plugin.clone())
            .collect())
    }

    fn load_schemas(&self, ids: &[SchemaId]) -> Result<Vec<Schema>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.manifests.iter().find_map(|m| m.property_schema(id)))
            .cloned()
            .collect())
    }

    fn load_properties(&self, ids: &[PropertyId]) -> Result<Vec<Property>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.properties.iter().find(|p| p.id() == id))
            .cloned()
            .collect())
    }

    fn load_datasets(&self, ids: &[DatasetId]) -> Result<Vec<Dataset>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.datasets.iter().find(|d| d.id() == id))
            .cloned()
            .collect())
    }
}

fn scene() -> Scene {
    let mut scene = Scene::new(SceneId::from("s1"), PropertyId::from("scene-prop"));
    scene
        .install_plugin(pid("marker@1.0.0"), Some(PropertyId::from("plugin-prop")))
        .unwrap();
    scene
        .add_widget(SceneWidget::new(
            WidgetId::from("w1"),
            pid("marker@1.0.0"),
            ext("legend"),
            PropertyId::from("legend-prop"),
        ))
        .unwrap();
    scene
        .add_widget(SceneWidget::new(
            WidgetId::from("w2"),
            pid("marker@1.0.0"),
            ext("banner"),
            PropertyId::from("banner-widget-prop"),
        ))
        .unwrap();
    scene
}

fn migrate(
    store: &Store,
    scene: &mut Scene,
    old: &str,
    new: &str,
) -> Result<MigratePluginsResult> {
    let plugins = |ids: &[PluginId]| store.load_plugins(ids);
    let schemas = |ids: &[SchemaId]| store.load_schemas(ids);
    let layers = |_: &SceneId| -> Result<Vec<Layer>> { Ok(store.layers.clone()) };
    let properties = |ids: &[PropertyId]| store.load_properties(ids);
    let datasets = |ids: &[DatasetId]| store.load_datasets(ids);
    let migrator = PluginMigrator {
        plugins: &plugins,
        schemas: &schemas,
        layers: &layers,
        properties: &properties,
        datasets: &datasets,
    };
    migrator.migrate_plugins(scene, &pid(old), &pid(new))
}

fn pointer(group: &str, field: &str) -> SchemaFieldPointer {
    SchemaFieldPointer::new(group_id(group), FieldId::new(field).unwrap())
}

// =============================================================================
// Successful Migration
// =============================================================================

#[test]
fn test_migrate_scene_plugin_and_widgets() {
    let store = Store::new();
    let mut scene = scene();
    let result = migrate(&store, &mut scene, "marker@1.0.0", "marker@1.1.0").unwrap();

    assert!(!scene.has_plugin(&pid("marker@1.0.0")));
    let installed = scene.plugin(&pid("marker@1.1.0")).unwrap();
    assert_eq!(installed.property(), Some(&PropertyId::from("plugin-prop")));

    assert_eq!(scene.widgets().len(), 1);
    let legend = scene.widget(&WidgetId::from("w1")).unwrap();
    assert_eq!(legend.plugin(), &pid("marker@1.1.0"));
    assert!(scene.widget(&WidgetId::from("w2")).is_none());

    assert_eq!(
        result.removed_properties,
        vec![
            PropertyId::from("banner-widget-prop"),
            PropertyId::from("banner-field-prop"),
            PropertyId::from("banner-layer-prop"),
        ]
    );
}

#[test]
fn test_migrate_layers_and_infoboxes() {
    let store = Store::new();
    let mut scene = scene();
    let result = migrate(&store, &mut scene, "marker@1.0.0", "marker@1.1.0").unwrap();

    assert_eq!(result.removed_layers, vec![LayerId::from("l2")]);
    assert_eq!(result.layers.len(), 1);

    let l1 = &result.layers[0];
    assert_eq!(l1.id(), &LayerId::from("l1"));
    assert_eq!(l1.plugin(), Some(&pid("marker@1.1.0")));
    let infobox = l1.infobox().unwrap();
    assert_eq!(infobox.fields().len(), 1);
    assert!(infobox.field(&InfoboxFieldId::from("f1")).is_none());
    assert_eq!(
        infobox.field(&InfoboxFieldId::from("f2")).unwrap().plugin(),
        &pid("other@1.0.0")
    );
}

#[test]
fn test_migrate_properties() {
    let store = Store::new();
    let mut scene = scene();
    let result = migrate(&store, &mut scene, "marker@1.0.0", "marker@1.1.0").unwrap();

    assert_eq!(result.properties.len(), 3);
    let find = |id: &str| {
        result
            .properties
            .iter()
            .find(|p| p.id() == &PropertyId::from(id))
            .unwrap()
    };

    let own = find("plugin-prop");
    assert_eq!(own.schema(), &SchemaId::parse("marker@1.1.0/@").unwrap());
    assert_eq!(
        own.field_by_pointer(&pointer("default", "size"))
            .and_then(|f| f.value())
            .and_then(|v| v.as_f64()),
        Some(10.0)
    );

    let legend = find("legend-prop");
    assert_eq!(legend.schema(), &SchemaId::parse("marker@1.1.0/legend").unwrap());
    assert_eq!(legend.fields().count(), 1);

    let pin = find("pin-prop");
    assert_eq!(pin.schema(), &SchemaId::parse("marker@1.1.0/pin").unwrap());

    let height = pin.field_by_pointer(&pointer("default", "height")).unwrap();
    assert_eq!(height.value_type(), &Type::STRING);
    assert_eq!(height.value().and_then(|v| v.as_str()), Some("12.5"));

    let location = pin.field_by_pointer(&pointer("default", "location")).unwrap();
    assert!(location.is_linked());

    assert!(pin.field_by_pointer(&pointer("default", "label")).is_none());
    let label = pin.field_by_pointer(&pointer("style", "label")).unwrap();
    assert_eq!(label.value().and_then(|v| v.as_str()), Some("Tokyo"));
    assert!(!label.is_linked());

    let shape = pin.field_by_pointer(&pointer("style", "shape")).unwrap();
    assert_eq!(shape.value().and_then(|v| v.as_str()), Some("image"));

    let schema = store
        .load_schemas(&[SchemaId::parse("marker@1.1.0/pin").unwrap()])
        .unwrap();
    assert!(pin.validate(&schema[0]).is_ok());
}

#[test]
fn test_persisted_scene_and_properties_migrate_the_same() {
    let store = Store::new();
    let fresh = scene();
    let mut loaded: Scene = serde_json::from_str(&serde_json::to_string(&fresh).unwrap()).unwrap();
    assert_eq!(loaded, fresh);

    let mut scene = fresh;
    let expected = migrate(&store, &mut scene, "marker@1.0.0", "marker@1.1.0").unwrap();

    let mut persisted = Store::new();
    let json = serde_json::to_string(&persisted.properties).unwrap();
    persisted.properties = serde_json::from_str(&json).unwrap();
    assert_eq!(persisted.properties, store.properties);

    let result = migrate(&persisted, &mut loaded, "marker@1.0.0", "marker@1.1.0").unwrap();
    assert_eq!(result, expected);
    assert_eq!(loaded, scene);

    let saved = serde_json::to_value(&result.properties).unwrap();
    let reloaded: Vec<Property> = serde_json::from_value(saved).unwrap();
    assert_eq!(reloaded, result.properties);
}

#[test]
fn test_persisted_empty_link_chain_is_rejected() {
    let store = Store::new();
    let pin = store
        .properties
        .iter()
        .find(|p| p.id() == &PropertyId::from("pin-prop"))
        .unwrap();

    let mut json = serde_json::to_value(pin).unwrap();
    let location = &mut json["items"][0]["fields"][0];
    assert_eq!(location["field"], "location");
    assert_eq!(location["links"][0]["field"], "pos");

    location["links"] = json!([]);
    assert!(serde_json::from_value::<Property>(json).is_err());
}

#[test]
fn test_persisted_property_with_duplicated_items_is_rejected() {
    let store = Store::new();
    let mut json = serde_json::to_value(&store.properties[2]).unwrap();
    let first = json["items"][0].clone();
    json["items"].as_array_mut().unwrap().push(first);
    assert!(serde_json::from_value::<Property>(json).is_err());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_same_version_is_invalid() {
    let store = Store::new();
    let mut scene = scene();
    let err = migrate(&store, &mut scene, "marker@1.0.0", "marker@1.0.0").unwrap_err();
    assert!(matches!(err, PluginError::InvalidPlugins));
}

#[test]
fn test_different_plugin_is_invalid() {
    let store = Store::new();
    let mut scene = scene();
    let err = migrate(&store, &mut scene, "marker@1.0.0", "pin@1.1.0").unwrap_err();
    assert!(matches!(err, PluginError::InvalidPlugins));
}

#[test]
fn test_missing_plugin_is_invalid() {
    let store = Store::new();
    let mut scene = scene();
    let err = migrate(&store, &mut scene, "marker@1.0.0", "marker@2.0.0").unwrap_err();
    assert!(matches!(err, PluginError::InvalidPlugins));
}

#[test]
fn test_target_already_installed_is_invalid() {
    let store = Store::new();
    let mut scene = scene();
    scene.install_plugin(pid("marker@1.1.0"), None).unwrap();
    let before = scene.clone();

    let err = migrate(&store, &mut scene, "marker@1.0.0", "marker@1.1.0").unwrap_err();
    assert!(matches!(err, PluginError::InvalidPlugins));
    assert_eq!(scene, before);
    assert_eq!(
        scene.widget(&WidgetId::from("w1")).unwrap().plugin(),
        &pid("marker@1.0.0")
    );
}

#[test]
fn test_plugin_not_installed() {
    let store = Store::new();
    let mut scene = Scene::new(SceneId::from("s1"), PropertyId::from("scene-prop"));
    let err = migrate(&store, &mut scene, "marker@1.0.0", "marker@1.1.0").unwrap_err();
    assert!(matches!(err, PluginError::PluginNotInstalled));
}

#[test]
fn test_loader_error_leaves_scene_untouched() {
    let store = Store::new();
    let mut scene = scene();
    let before = scene.clone();

    let plugins = |ids: &[PluginId]| store.load_plugins(ids);
    let schemas = |ids: &[SchemaId]| store.load_schemas(ids);
    let layers = |_: &SceneId| -> Result<Vec<Layer>> { Ok(store.layers.clone()) };
    let properties = |_: &[PropertyId]| -> Result<Vec<Property>> {
        Err(PluginError::Loader("property store unavailable".to_string()))
    };
    let datasets = |ids: &[DatasetId]| store.load_datasets(ids);
    let migrator = PluginMigrator {
        plugins: &plugins,
        schemas: &schemas,
        layers: &layers,
        properties: &properties,
        datasets: &datasets,
    };

    let err = migrator
        .migrate_plugins(&mut scene, &pid("marker@1.0.0"), &pid("marker@1.1.0"))
        .unwrap_err();
    assert_eq!(err.to_string(), "loader error: property store unavailable");
    assert_eq!(scene, before);
}
