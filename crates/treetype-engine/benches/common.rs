// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_python(functions: usize) -> String {
    let mut source = String::from("import math\n\n");
    for i in 0..functions {
        source.push_str(&format!(
            "def area_{i}(radius, scale=1.0):\n    \"\"\"Area of circle {i}.\"\"\"\n    \
             # scale first\n    r = radius * scale\n    return {{'value': math.pi * r ** 2, \
             'ids': [{i}, {i} + 1]}}\n\n\n"
        ));
    }
    source
}

#[allow(dead_code)]
pub fn generate_tsx(components: usize) -> String {
    let mut source = String::from("import React from 'react';\n\n");
    for i in 0..components {
        source.push_str(&format!(
            "export function Item{i}({{ label }}: {{ label: string }}) {{\n  /* item {i} */\n  \
             return (\n    <li className=\"item\">\n      Label: {{label}} #{i}\n    </li>\n  );\n\
             }}\n\n"
        ));
    }
    source
}
