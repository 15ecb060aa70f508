//! Push-based scoring network.
//!
//! A network is a tree of nodes rooted at one input. Each document's paired
//! value is pushed through every reachable node, depth-first, before the next
//! document arrives. Transforms feed children; sinks ([`Inspector`]s) keep
//! running state and write a report when [`Inspector::finish`] is called.
//!
//! ```text
//!            EvalPair<gold, system>
//!                     │ extract both sides
//!          EvalPair<ResponsesAndLinking, ..>
//!            ┌────────┴─────────┐
//!        args both          linking both
//!            │                  │ restrict gold
//!      EquivalenceAligner   LinkingScorer
//!      ┌─────┼──────┐
//!  aggregate bootstrap error log
//! ```
//!
//! Wiring is explicit and typed: each builder call names the transform and
//! receives the child node to wire further.
//!
//! ```rust
//! use eal_scorer::eval::network::{InspectionNode, Inspector, Shared};
//! use eal_scorer::Result;
//!
//! #[derive(Default)]
//! struct Sum(usize);
//!
//! impl Inspector<usize> for Sum {
//!     fn inspect(&mut self, item: &usize) -> Result<()> {
//!         self.0 += item;
//!         Ok(())
//!     }
//!     fn finish(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let lengths = Shared::new(Sum::default());
//! let mut root: InspectionNode<String> = InspectionNode::new();
//! root.map(|s: &String| s.len(), |node| {
//!     node.inspect_with(lengths.clone());
//! });
//!
//! root.inspect(&"four".to_string()).unwrap();
//! root.inspect(&"five!".to_string()).unwrap();
//! root.finish().unwrap();
//! assert_eq!(lengths.borrow().0, 9);
//! ```

use crate::Result;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

// =============================================================================
// Node capabilities
// =============================================================================

/// A consumer of one item per document.
pub trait Inspector<T> {
    /// Consume one item.
    fn inspect(&mut self, item: &T) -> Result<()>;

    /// Flush aggregate state. Called once, after the last item.
    fn finish(&mut self) -> Result<()>;
}

/// A per-document function from one value to another, possibly stateful.
pub trait Transform<A, B> {
    /// Produce the output for one input.
    fn apply(&mut self, input: &A) -> Result<B>;

    /// Called once after the last input.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Adapts a closure into a [`Transform`].
pub struct MapTransform<F>(pub F);

impl<A, B, F> Transform<A, B> for MapTransform<F>
where
    F: FnMut(&A) -> B,
{
    fn apply(&mut self, input: &A) -> Result<B> {
        Ok((self.0)(input))
    }
}

/// A node component the caller keeps a handle to.
///
/// Extractors and sinks are wired into the network by value; wrapping them in
/// `Shared` lets the caller read their state after the run.
pub struct Shared<X>(Rc<RefCell<X>>);

impl<X> Shared<X> {
    /// Wrap a component.
    pub fn new(inner: X) -> Self {
        Self(Rc::new(RefCell::new(inner)))
    }

    /// Borrow the component.
    pub fn borrow(&self) -> Ref<'_, X> {
        self.0.borrow()
    }

    /// Borrow the component mutably.
    pub fn borrow_mut(&self) -> RefMut<'_, X> {
        self.0.borrow_mut()
    }
}

impl<X> Clone for Shared<X> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T, X: Inspector<T>> Inspector<T> for Shared<X> {
    fn inspect(&mut self, item: &T) -> Result<()> {
        self.0.borrow_mut().inspect(item)
    }

    fn finish(&mut self) -> Result<()> {
        self.0.borrow_mut().finish()
    }
}

impl<A, B, X: Transform<A, B>> Transform<A, B> for Shared<X> {
    fn apply(&mut self, input: &A) -> Result<B> {
        self.0.borrow_mut().apply(input)
    }

    fn finish(&mut self) -> Result<()> {
        self.0.borrow_mut().finish()
    }
}

// =============================================================================
// Paired values
// =============================================================================

/// A gold (`key`) value paired with a system (`test`) value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalPair<K, T> {
    /// Gold side
    pub key: K,
    /// System side
    pub test: T,
}

impl<K, T> EvalPair<K, T> {
    /// Pair a gold value with a system value.
    pub fn of(key: K, test: T) -> Self {
        Self { key, test }
    }
}

/// Apply the same function to both sides of a pair.
pub fn transform_both<A, B>(
    mut f: impl FnMut(&A) -> B,
) -> impl FnMut(&EvalPair<A, A>) -> EvalPair<B, B> {
    move |pair| EvalPair::of(f(&pair.key), f(&pair.test))
}

/// Applies one transform to the gold side and another to the system side.
pub struct PairTransform<L, R> {
    key: L,
    test: R,
}

impl<L, R> PairTransform<L, R> {
    /// Combine a gold-side and a system-side transform.
    pub fn new(key: L, test: R) -> Self {
        Self { key, test }
    }
}

impl<KA, TA, KB, TB, L, R> Transform<EvalPair<KA, TA>, EvalPair<KB, TB>> for PairTransform<L, R>
where
    L: Transform<KA, KB>,
    R: Transform<TA, TB>,
{
    fn apply(&mut self, input: &EvalPair<KA, TA>) -> Result<EvalPair<KB, TB>> {
        Ok(EvalPair::of(
            self.key.apply(&input.key)?,
            self.test.apply(&input.test)?,
        ))
    }

    fn finish(&mut self) -> Result<()> {
        self.key.finish()?;
        self.test.finish()
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// A fan-out point: every item is passed to each child in wiring order.
pub struct InspectionNode<T> {
    children: Vec<Box<dyn Inspector<T>>>,
}

impl<T> Default for InspectionNode<T> {
    fn default() -> Self {
        Self {
            children: Vec::new(),
        }
    }
}

impl<T: 'static> InspectionNode<T> {
    /// Node with no children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether nothing is wired below this node.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Attach a sink.
    pub fn inspect_with(&mut self, inspector: impl Inspector<T> + 'static) -> &mut Self {
        self.children.push(Box::new(inspector));
        self
    }

    /// Attach a transform and wire its output node.
    pub fn transformed<U: 'static>(
        &mut self,
        transform: impl Transform<T, U> + 'static,
        wire: impl FnOnce(&mut InspectionNode<U>),
    ) -> &mut Self {
        let mut downstream = InspectionNode::new();
        wire(&mut downstream);
        self.children.push(Box::new(TransformedNode {
            transform,
            downstream,
        }));
        self
    }

    /// Attach an infallible function and wire its output node.
    pub fn map<U: 'static>(
        &mut self,
        f: impl FnMut(&T) -> U + 'static,
        wire: impl FnOnce(&mut InspectionNode<U>),
    ) -> &mut Self {
        self.transformed(MapTransform(f), wire)
    }
}

impl<T> Inspector<T> for InspectionNode<T> {
    fn inspect(&mut self, item: &T) -> Result<()> {
        for child in &mut self.children {
            child.inspect(item)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for child in &mut self.children {
            child.finish()?;
        }
        Ok(())
    }
}

struct TransformedNode<X, U> {
    transform: X,
    downstream: InspectionNode<U>,
}

impl<T, U, X: Transform<T, U>> Inspector<T> for TransformedNode<X, U> {
    fn inspect(&mut self, item: &T) -> Result<()> {
        let output = self.transform.apply(item)?;
        self.downstream.inspect(&output)
    }

    fn finish(&mut self) -> Result<()> {
        self.downstream.finish()?;
        self.transform.finish()
    }
}
