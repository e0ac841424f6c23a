//! Execution engine for finalized method bodies.

use crate::{
    model::{ClassBody, ClassId, Instruction, Literal, MethodDef, MethodSignature},
    spec::HookFn,
};

use super::{HookSink, Raised, Value};

/// Call depth at which execution gives up with a stack-overflow raise.
const MAX_CALL_DEPTH: usize = 128;

/// Outcome of executing a method: normal completion or a propagated raise.
pub type Execution<T> = std::result::Result<T, Raised>;

/// Executes finalized method bodies of one class, standing in for the host
/// runtime.
///
/// The machine implements exactly the semantics the engine's generated code
/// relies on: explicit-slot calls, a small evaluation stack for handler
/// plumbing, and exception dispatch through the body's region table. A raise
/// unwinds to the innermost declaring region whose filter matches the raised
/// class; with no matching region it propagates to the caller unchanged.
///
/// Injected hook calls run inline on the executing thread, dispatched to the
/// supplied [`HookSink`]; the machine adds no synchronization of its own.
///
/// # Examples
///
/// ```rust
/// use leakscope::interp::{Machine, RecordingSink};
/// use leakscope::model::{ClassBody, ClassId};
///
/// let class = ClassBody::new(ClassId::new("demo/Empty"), vec![]);
/// let mut machine = Machine::new(&class);
/// let mut sink = RecordingSink::new();
/// // No constructor on this class: the construct call raises.
/// assert!(machine
///     .construct(&leakscope::model::MethodSignature::constructor(vec![]), vec![], &mut sink)
///     .is_err());
/// ```
#[derive(Debug)]
pub struct Machine<'a> {
    class: &'a ClassBody,
    next_object: u32,
    depth: usize,
}

impl<'a> Machine<'a> {
    /// Create a machine over one class.
    #[must_use]
    pub fn new(class: &'a ClassBody) -> Self {
        Machine {
            class,
            next_object: 1,
            depth: 0,
        }
    }

    /// Run a constructor: allocates the receiver, executes the `<init>` body
    /// with the receiver at slot 0 and `args` at 1.., and returns the new
    /// object reference.
    pub fn construct(
        &mut self,
        signature: &MethodSignature,
        args: Vec<Value>,
        sink: &mut dyn HookSink,
    ) -> Execution<Value> {
        let method = self.lookup(signature)?;
        let receiver = self.allocate();
        let mut slots = vec![receiver.clone()];
        slots.extend(args);
        self.run(method, slots, sink)?;
        Ok(receiver)
    }

    /// Invoke an instance method on an existing object.
    pub fn invoke(
        &mut self,
        receiver: Value,
        signature: &MethodSignature,
        args: Vec<Value>,
        sink: &mut dyn HookSink,
    ) -> Execution<()> {
        let method = self.lookup(signature)?;
        let mut slots = vec![receiver];
        slots.extend(args);
        self.run(method, slots, sink)
    }

    fn allocate(&mut self) -> Value {
        let id = self.next_object;
        self.next_object += 1;
        Value::Obj(id)
    }

    fn lookup(&self, signature: &MethodSignature) -> Execution<&'a MethodDef> {
        self.class.method(signature).ok_or_else(|| {
            Raised::new(
                ClassId::new("java/lang/NoSuchMethodError"),
                &format!("{}.{}", self.class.id, signature),
                format!("{}", self.class.id),
            )
        })
    }

    fn raise_here(&self, method: &MethodDef, class: &str, message: &str) -> Raised {
        Raised::new(
            ClassId::new(class),
            message,
            format!("{}.{}", self.class.id, method.signature.name),
        )
    }

    fn run(
        &mut self,
        method: &'a MethodDef,
        mut slots: Vec<Value>,
        sink: &mut dyn HookSink,
    ) -> Execution<()> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(self.raise_here(method, "java/lang/StackOverflowError", "call depth limit"));
        }
        self.depth += 1;
        let result = self.run_frame(method, &mut slots, sink);
        self.depth -= 1;
        result
    }

    fn run_frame(
        &mut self,
        method: &'a MethodDef,
        slots: &mut Vec<Value>,
        sink: &mut dyn HookSink,
    ) -> Execution<()> {
        slots.resize(method.max_slot as usize, Value::Null);

        let instructions = &method.body.instructions;
        let mut stack: Vec<Value> = Vec::new();
        let mut pc: usize = 0;

        // A raise either transfers to a covering handler of this frame or
        // propagates to the caller.
        macro_rules! dispatch {
            ($raised:expr) => {{
                let raised = $raised;
                let handler = method.body.regions.iter().find(|r| {
                    let (Some(start), Some(end), Some(_)) =
                        (r.start.offset(), r.end.offset(), r.handler.offset())
                    else {
                        return false;
                    };
                    let at = pc as u32;
                    start <= at && at < end && r.catch_class == raised.class
                });
                match handler.and_then(|r| r.handler.offset()) {
                    Some(entry) => {
                        stack.clear();
                        stack.push(Value::Exception(Box::new(raised)));
                        pc = entry as usize;
                        continue;
                    }
                    None => return Err(raised),
                }
            }};
        }

        while pc < instructions.len() {
            match &instructions[pc] {
                Instruction::Nop => {}
                Instruction::LoadSlot(slot) => {
                    let value = slots
                        .get(*slot as usize)
                        .cloned()
                        .unwrap_or(Value::Null);
                    stack.push(value);
                }
                Instruction::StoreSlot(slot) => {
                    let Some(value) = stack.pop() else {
                        dispatch!(self.raise_here(method, "java/lang/VerifyError", "store on empty stack"));
                    };
                    let index = *slot as usize;
                    if index >= slots.len() {
                        slots.resize(index + 1, Value::Null);
                    }
                    slots[index] = value;
                }
                Instruction::Dup => {
                    let Some(top) = stack.last().cloned() else {
                        dispatch!(self.raise_here(method, "java/lang/VerifyError", "dup on empty stack"));
                    };
                    stack.push(top);
                }
                Instruction::PushLiteral(literal) => stack.push(match literal {
                    Literal::Str(s) => Value::Str(s.clone()),
                    Literal::Int(i) => Value::Int(*i),
                    Literal::Bool(b) => Value::Bool(*b),
                    Literal::Null => Value::Null,
                }),
                Instruction::InvokeHook { hook, arg_slots } => {
                    let arg = |i: usize| -> Value {
                        arg_slots
                            .get(i)
                            .and_then(|s| slots.get(*s as usize))
                            .cloned()
                            .unwrap_or(Value::Null)
                    };
                    match hook {
                        HookFn::Open => sink.open(arg(0), arg(1)),
                        HookFn::Close => sink.close(arg(0)),
                        HookFn::OpenSocket => sink.open_socket(arg(0)),
                        HookFn::OutOfDescriptors => sink.out_of_descriptors(),
                    }
                }
                Instruction::CallInternal { name, arg_slots } => {
                    let Some(callee) = self.class.method_by_name(name) else {
                        dispatch!(self.raise_here(
                            method,
                            "java/lang/NoSuchMethodError",
                            &format!("{}.{}", self.class.id, name)
                        ));
                    };
                    let callee_slots: Vec<Value> = arg_slots
                        .iter()
                        .map(|s| slots.get(*s as usize).cloned().unwrap_or(Value::Null))
                        .collect();
                    if let Err(raised) = self.run(callee, callee_slots, sink) {
                        dispatch!(raised);
                    }
                }
                Instruction::ExtractMessage => {
                    let Some(Value::Exception(raised)) = stack.pop() else {
                        dispatch!(self.raise_here(method, "java/lang/VerifyError", "message of non-exception"));
                    };
                    stack.push(Value::Str(raised.message.clone()));
                }
                Instruction::Contains => {
                    let (Some(Value::Str(needle)), Some(Value::Str(haystack))) =
                        (stack.pop(), stack.pop())
                    else {
                        dispatch!(self.raise_here(method, "java/lang/VerifyError", "contains on non-strings"));
                    };
                    stack.push(Value::Bool(haystack.contains(&needle)));
                }
                Instruction::BranchIfFalse(target) => {
                    let Some(Value::Bool(condition)) = stack.pop() else {
                        dispatch!(self.raise_here(method, "java/lang/VerifyError", "branch on non-boolean"));
                    };
                    if !condition {
                        let Some(offset) = target.offset() else {
                            dispatch!(self.raise_here(method, "java/lang/VerifyError", "unresolved branch target"));
                        };
                        pc = offset as usize;
                        continue;
                    }
                }
                Instruction::Branch(target) => {
                    let Some(offset) = target.offset() else {
                        dispatch!(self.raise_here(method, "java/lang/VerifyError", "unresolved branch target"));
                    };
                    pc = offset as usize;
                    continue;
                }
                Instruction::RaiseNew { class, message } => {
                    dispatch!(Raised::new(
                        class.clone(),
                        message,
                        format!("{}.{}", self.class.id, method.signature.name)
                    ));
                }
                Instruction::Rethrow => {
                    let Some(Value::Exception(raised)) = stack.pop() else {
                        dispatch!(self.raise_here(method, "java/lang/VerifyError", "rethrow of non-exception"));
                    };
                    // Same value, same identity: dispatch against *outer*
                    // regions only would be the host's job; within this frame
                    // the rethrow site is outside the guarded range, so this
                    // propagates unless another region covers it.
                    dispatch!(*raised);
                }
                Instruction::Return => return Ok(()),
            }
            pc += 1;
        }
        Ok(())
    }
}
