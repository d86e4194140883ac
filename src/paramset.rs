//! Parameter Sets.

use crate::base::*;
use std::collections::HashMap;

/// Define a macro that generates a function for adding/replacing a
/// parameter.
macro_rules! paramset_add {
    ($func: ident, $t: ty, $map: ident) => {
        pub fn $func(&mut self, name: &str, value: $t) {
            self.$map.insert(String::from(name), value);
        }
    };
}

/// Define a macro that generates a function for finding a parameter,
/// falling back to a default when it is absent.
macro_rules! paramset_find_one {
    ($func: ident, $t: ty, $map: ident) => {
        pub fn $func(&self, name: &str, default: $t) -> $t {
            match self.$map.get(name) {
                Some(value) => value.clone(),
                None => default,
            }
        }
    };
}

/// Stores named configuration parameters of different types. This is the
/// surface through which the light distribution factory receives its
/// settings.
#[derive(Clone, Default)]
pub struct ParamSet {
    pub bools: HashMap<String, bool>,
    pub ints: HashMap<String, Int>,
    pub floats: HashMap<String, Float>,
    pub strings: HashMap<String, String>,
}

impl ParamSet {
    /// Returns a new empty `ParamSet`.
    pub fn new() -> Self {
        Self::default()
    }

    paramset_add!(add_bool, bool, bools);
    paramset_add!(add_int, Int, ints);
    paramset_add!(add_float, Float, floats);
    paramset_add!(add_string, String, strings);

    paramset_find_one!(find_one_bool, bool, bools);
    paramset_find_one!(find_one_int, Int, ints);
    paramset_find_one!(find_one_float, Float, floats);
    paramset_find_one!(find_one_string, String, strings);
}
