// Array value model for Content Tree
// Every value carries a column-major dimension vector and a class name,
// the way MAT-style containers describe their variables.

mod class;
mod dims;
mod value;

pub use class::NumericClass;
pub use dims::{
    checked_numel, dims_string, format_subscript, is_vector, linear_to_subscripts, numel,
    subscripts_to_linear, Dims,
};
pub use value::{CellArray, CharArray, LogicalArray, NumericArray, SparseArray, StructArray, Value};
