//! Data sources.

use mg_core::{Accessor, Registry, RegistryError, TypeDecl, Value, ValueType};

pub(crate) fn declare(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.declare(TypeDecl::new("DataSource").parent("Model").abstract_type())?;
    registry.declare(
        TypeDecl::new("ColumnarDataSource")
            .parent("DataSource")
            .abstract_type(),
    )?;

    registry.declare(
        TypeDecl::new("ColumnDataSource")
            .parent("ColumnarDataSource")
            .doc("Named columns of equal length.")
            .property(
                "data",
                ValueType::dict(ValueType::string(), ValueType::list(ValueType::any()))
                    .with_default(Value::Dict(std::collections::BTreeMap::new())),
            )
            .computed(
                "column_names",
                Accessor::read_only(|model| {
                    let data = model.get("data")?;
                    let names = data
                        .as_dict()
                        .map(|columns| columns.keys().map(String::as_str).map(Value::from).collect())
                        .unwrap_or_default();
                    Ok(Value::List(names))
                }),
            ),
    )?;
    Ok(())
}
