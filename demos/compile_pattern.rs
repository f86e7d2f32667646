use paperbush::{Compiler, Fragment};

fn main() {
    let input: Vec<String> = std::env::args().skip(1).collect();
    let pattern = if input.is_empty() {
        "square:int --verbosity:int:[0, 1, 2]=0 ^ --quiet -o|--output=None".to_string()
    } else {
        input.join(" ")
    };

    let schema = match Compiler::new().compile(&pattern) {
        Ok(schema) => schema,
        Err(error) => {
            eprintln!("Compile error: {error}");
            std::process::exit(1);
        }
    };

    for fragment in &schema {
        match fragment {
            Fragment::Argument(argument) => {
                let flags: Vec<String> = argument.flags().map(|f| format!("'{f}'")).collect();
                let keywords: Vec<String> =
                    argument.keywords().iter().map(ToString::to_string).collect();
                let mut parts = flags;
                parts.extend(keywords);
                println!("add_argument({})", parts.join(", "));
            }
            Fragment::Separator => println!("# separator"),
        }
    }

    for group in schema.groups() {
        println!("# linked: {group:?}");
    }
}
