use std::{borrow::Cow, fmt, panic::Location};

/// Identifies the code that invoked a logging operation.
///
/// Either a function path, resolved at compile time by [`caller!`](crate::caller),
/// or a `file:line` call-site location captured through `#[track_caller]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller(Cow<'static, str>);

impl Caller {
    /// Wraps a type name produced inside a function, as done by [`caller!`](crate::caller).
    pub fn function(type_name: &'static str) -> Self {
        Self(Cow::Borrowed(trim_function_path(type_name)))
    }

    /// The location of whoever called this, or of whoever called the
    /// `#[track_caller]` function that called this.
    #[track_caller]
    pub fn here() -> Self {
        Self::from_location(Location::caller())
    }

    pub fn from_location(location: &Location<'_>) -> Self {
        Self(Cow::Owned(format!("{}:{}", location.file(), location.line())))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn trim_function_path(type_name: &'static str) -> &'static str {
    let mut path = type_name.strip_suffix("::__caller").unwrap_or(type_name);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path
}

/// Resolves the path of the enclosing function, e.g. `my_crate::net::connect`.
///
/// Closures and async blocks report the named function they live in.
#[macro_export]
macro_rules! caller {
    () => {{
        fn __caller() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::Caller::function(__type_name_of(__caller))
    }};
}
