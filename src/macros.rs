/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Map literals keep their key order. Anything that is not `null`, a boolean,
/// an array or a map literal is converted with `Value::from`.
///
/// # Examples
///
/// ```rust
/// use entity_map::{value, Value};
///
/// let user = value!({
///     "Id": 1,
///     "Username": "Jack",
///     "Tags": ["admin", null]
/// });
///
/// let map = user.as_map().unwrap();
/// assert_eq!(map.get("Username"), Some(&Value::from("Jack")));
/// assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Id", "Username", "Tags"]);
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::EntityMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::EntityMap::new();
        $(
            map.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Map(map)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
