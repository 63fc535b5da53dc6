use crate::model::{ObjectScope, SchemaObject};
use std::io::{self, Write};

/// One-line description of an object, e.g. `table "public"."t1"`.
pub fn format_object(object: &SchemaObject) -> String {
    let name = match &object.name {
        Some(name) if !name.parts.is_empty() || name.has_external_parts() => name.to_string(),
        _ => "<unnamed>".to_string(),
    };
    match object.scope {
        ObjectScope::Local => format!("{} {name}", object.kind.label()),
        ObjectScope::External => format!("{} {name} (external)", object.kind.label()),
    }
}

pub fn write_objects<'a, W, I>(out: &mut W, title: &str, objects: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a SchemaObject>,
{
    writeln!(out, "{title}")?;
    let mut count = 0;
    for object in objects {
        writeln!(out, "  {}", format_object(object))?;
        count += 1;
    }
    writeln!(out, "  ({count} objects)")?;
    Ok(count)
}

/// Prints a heading followed by one line per object to stdout.
pub fn print_objects<'a, I>(title: &str, objects: I) -> io::Result<usize>
where
    I: IntoIterator<Item = &'a SchemaObject>,
{
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_objects(&mut lock, title, objects)
}
