use ir::{
    interpret::{evaluate_block, Locals},
    Block, Immediate,
};
use once_cell::sync::Lazy;
use regex::Regex;
use stackify_codegen::{stackify, StackifyConfig};
use stackify_interpreter::{Machine, MachineError};
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

pub fn parse_test_cases(parsed: &ParsedBlock) -> Result<Vec<TestCase>, String> {
    parsed
        .comments
        .iter()
        .filter(|c| c.starts_with("#!"))
        .map(|c| TestCase::parse(c))
        .collect()
}

#[derive(Debug)]
pub struct TestCase {
    locals: Vec<(u32, Immediate)>,
    expect: Option<Vec<(u32, Immediate)>>,
    text: String,
}

impl TestCase {
    /// Runs `block` directly and through the stack machine from the same initial locals.
    pub fn run(&self, block: &Block) -> Result<(), String> {
        let config = StackifyConfig::for_block(block);
        let stackified = stackify(block, &config).map_err(|e| self.error(&e.to_string()))?;

        let mut reference = Locals::with_values(self.locals.iter().copied());
        let reference_result = evaluate_block(block, &mut reference);

        let mut locals = Locals::with_values(self.locals.iter().copied());
        let result = Machine::new(&mut locals).run(&stackified.code);

        match (reference_result, result) {
            (Ok(_), Ok(())) => {}
            (Err(expected), Err(MachineError::Eval { source, .. })) if expected == source => {
                return Ok(());
            }
            (expected, evaluated) => {
                return Err(self.error(&format!(
                    "Expected: {:?}\nEvaluated: {evaluated:?}",
                    expected.map(|_| ())
                )));
            }
        }

        if locals.log() != reference.log() {
            return Err(self.error(&format!(
                "Store log differs.\nExpected: {:?}\nEvaluated: {:?}",
                reference.log(),
                locals.log()
            )));
        }

        let program_locals = locals.program_locals(config.local_base);
        if program_locals != reference.program_locals(config.local_base) {
            return Err(self.error(&format!(
                "Program locals differ.\nExpected: {:?}\nEvaluated: {program_locals:?}",
                reference.program_locals(config.local_base),
            )));
        }

        if let Some(expect) = &self.expect {
            for &(local, value) in expect {
                let evaluated = program_locals.get(&local).copied().unwrap_or_default();
                if evaluated != value {
                    return Err(self.error(&format!(
                        "Local {local}.\nExpected: {value}\nEvaluated: {evaluated}"
                    )));
                }
            }
        }

        Ok(())
    }

    fn parse(comment: &str) -> Result<Self, String> {
        let Some(caps) = PATTERN.captures(comment) else {
            return Err(format!(
                "Parsing Error:\n\
                Comment: `{comment}`\n\
                Expected Format: `#! locals: 0=1, 1=2 -> 0=3`."
            ));
        };

        let locals = parse_pairs(&caps["locals"])?;
        let expect = caps
            .name("expect")
            .map(|m| parse_pairs(m.as_str()))
            .transpose()?;

        Ok(Self {
            locals,
            expect,
            text: comment.to_string(),
        })
    }

    fn error(&self, msg: &str) -> String {
        format!("[{}]: {msg}", self.text)
    }
}

fn parse_pairs(input: &str) -> Result<Vec<(u32, Immediate)>, String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (local, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("`{pair}` is not a `local=value` pair"))?;
            let local = local.trim().parse::<u32>().map_err(|e| e.to_string())?;
            let value = value.trim().parse::<Immediate>().map_err(|e| e.to_string())?;
            Ok((local, value))
        })
        .collect()
}

static PATTERN: Lazy<Regex> = Lazy::new(|| {
    // #! locals: (local=value,)* (-> (local=value,)*)?
    Regex::new(
        r"(?x)
        ^\#!\s*locals:
        (?P<locals>[0-9=,\s-]*?)
        (?:->(?P<expect>[0-9=,\s-]*))?
        $
    ",
    )
    .unwrap()
});
