use stackify_parser::ParsedBlock;

pub fn parse_block(file_path: &str) -> ParsedBlock {
    let content = std::fs::read_to_string(file_path).unwrap();

    match stackify_parser::parse_block(&content) {
        Ok(r) => r,
        Err(errs) => {
            let mut err_str = String::new();
            for err in errs {
                err_str.push_str(&err.print_to_string(file_path, &content, false));
                err_str.push('\n');
            }
            panic!("{err_str}");
        }
    }
}

/// Asserts that a value matches the snapshot stored next to the fixture.
#[macro_export]
macro_rules! snap_test {
    ($value:expr, $fixture_path: expr) => {
        let mut settings = insta::Settings::new();
        let fixture_path = ::std::path::Path::new($fixture_path);
        let fixture_dir = fixture_path.parent().unwrap();
        let fixture_name = fixture_path.file_stem().unwrap().to_str().unwrap();

        settings.set_snapshot_path(fixture_dir);
        settings.set_input_file($fixture_path);
        settings.set_prepend_module_to_snapshot(false);
        settings.set_omit_expression(true);
        settings.bind(|| {
            insta::assert_snapshot!(fixture_name, $value);
        })
    };
}
