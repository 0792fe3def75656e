use std::process;
use std::sync::Arc;

use clap::Parser as ClapParser;

use stapel::{
    ClassDescriptor, ClassId, EntryPoint, Env, EnvCreateInfo, MethodDescriptor, MethodId,
    Process, ProcessCreateInfo, Value,
};

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Built-in program to run
    #[arg(default_value = "compose", help = "Program to run: compose | countdown")]
    program: String,

    /// Countdown start value
    #[arg(short, long, default_value_t = 100_000)]
    n: i64,

    /// Data stack capacity in slots
    #[arg(long, default_value_t = 1024)]
    data_stack_size: usize,

    /// Call stack capacity in activation records
    #[arg(long, default_value_t = 1024)]
    call_stack_size: usize,
}

// --- compose: f.bump(g.call(x), x) through one call and one tail call ---

const ADDER: ClassId = ClassId(0);
const FIVE: ClassId = ClassId(1);
const PROGRAM: ClassId = ClassId(2);

const M_BUMP: MethodId = MethodId(0);
const M_CALL: MethodId = MethodId(1);
const M_COMPOSE: MethodId = MethodId(2);

// (a, b) -> a + b
fn adder_bump(p: &mut Process) {
    let a = p.arg(0).as_int();
    let b = p.arg(1).as_int();
    p.ret(Value::from_int(a + b));
}

// (x) -> 5
fn five_call(p: &mut Process) {
    p.ret(Value::from_int(5));
}

// (f, g, x) -> f.bump(g.call(x), x)
fn compose(p: &mut Process) {
    match p.resume() {
        0 => {
            let g = p.arg(1);
            let x = p.arg(2);
            p.prepare_call(1);
            p.write_arg(0, x);
            p.call(g, M_CALL, 1);
        }
        _ => {
            let r0 = p.last_result();
            p.write(3, r0);
            let f = p.arg(0);
            let x = p.arg(2);
            p.prepare_tail_call(2);
            p.write_arg(0, p.read(3));
            p.write_arg(1, x);
            p.tail_call(f, M_BUMP);
        }
    }
}

fn compose_entry(p: &mut Process) {
    match p.resume() {
        0 => {
            let f = p.construct(ADDER, &[]);
            let g = p.construct(FIVE, &[]);
            let program = p.construct(PROGRAM, &[]);
            p.prepare_call(3);
            p.write_arg(0, f);
            p.write_arg(1, g);
            p.write_arg(2, Value::from_int(3));
            p.call(program, M_COMPOSE, 1);
        }
        _ => {
            let result = p.last_result();
            p.ret(result);
        }
    }
}

fn compose_env() -> Arc<Env> {
    Env::new(EnvCreateInfo {
        classes: vec![
            ClassDescriptor { id: ADDER, fieldc: 0 },
            ClassDescriptor { id: FIVE, fieldc: 0 },
            ClassDescriptor { id: PROGRAM, fieldc: 0 },
        ],
        methods: vec![
            MethodDescriptor { class: ADDER, method: M_BUMP, argc: 2, varc: 2, routine: adder_bump },
            MethodDescriptor { class: FIVE, method: M_CALL, argc: 1, varc: 1, routine: five_call },
            MethodDescriptor {
                class: PROGRAM,
                method: M_COMPOSE,
                argc: 3,
                varc: 4,
                routine: compose,
            },
        ],
        entry: EntryPoint { routine: compose_entry, varc: 0 },
    })
}

// --- countdown: sum 1..=n through a tail-recursive fold ---

const COUNTER: ClassId = ClassId(0);
const M_FOLD: MethodId = MethodId(0);

// (n, acc) -> n == 0 ? acc : self.fold(n - 1, acc + n)
fn counter_fold(p: &mut Process) {
    let n = p.arg(0).as_int();
    let acc = p.arg(1).as_int();
    if n == 0 {
        p.ret(Value::from_int(acc));
    } else {
        p.prepare_tail_call(2);
        p.write_arg(0, Value::from_int(n - 1));
        p.write_arg(1, Value::from_int(acc + n));
        p.tail_call(p.receiver(), M_FOLD);
    }
}

// entry frame slot 0 holds the start value, written by the bootstrap
fn countdown_entry(p: &mut Process) {
    match p.resume() {
        0 => {
            let n = p.read(0);
            let counter = p.construct(COUNTER, &[]);
            p.prepare_call(2);
            p.write_arg(0, n);
            p.write_arg(1, Value::from_int(0));
            p.call(counter, M_FOLD, 1);
        }
        _ => {
            let result = p.last_result();
            p.ret(result);
        }
    }
}

fn countdown_env() -> Arc<Env> {
    Env::new(EnvCreateInfo {
        classes: vec![ClassDescriptor { id: COUNTER, fieldc: 0 }],
        methods: vec![MethodDescriptor {
            class: COUNTER,
            method: M_FOLD,
            argc: 2,
            varc: 2,
            routine: counter_fold,
        }],
        entry: EntryPoint { routine: countdown_entry, varc: 1 },
    })
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let info = ProcessCreateInfo {
        data_stack_size: cli.data_stack_size,
        call_stack_size: cli.call_stack_size,
    };

    let result = match cli.program.as_str() {
        "compose" => compose_env().run(&info),
        "countdown" => {
            let mut p = Process::new(countdown_env(), &info);
            p.boot();
            p.write(0, Value::from_int(cli.n));
            p.drive()
        }
        other => {
            eprintln!("unknown program '{other}', expected compose | countdown");
            process::exit(2);
        }
    };

    println!("{}", result.as_int());
}
